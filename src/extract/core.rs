use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use super::multipart::{parse_multipart, unquote};
use crate::config::BindConfig;
use crate::params::{collapse_values, params_from_json, FormValues, ParamMap};

/// Key under which multipart file parts are collected.
pub const FILES_KEY: &str = "files";

/// Failure turning a request body into parameters.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("multipart content type has no boundary")]
    MissingBoundary,
    #[error("multipart body of {size} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge { size: usize, limit: usize },
    #[error("malformed multipart body: {0}")]
    Multipart(String),
}

/// A parsed `Content-Type` value: lower-cased essence plus parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaType {
    pub essence: String,
    pub params: Vec<(String, String)>,
}

impl MediaType {
    pub fn parse(value: &str) -> Self {
        let mut pieces = value.split(';');
        let essence = pieces
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let params = pieces
            .filter_map(|p| p.split_once('='))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), unquote(v.trim())))
            .collect();
        MediaType { essence, params }
    }

    /// Parameter value by case-insensitive name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_json(&self) -> bool {
        self.essence == "application/json"
            || self.essence == "text/json"
            || self.essence.ends_with("+json")
    }

    pub fn is_multipart_form(&self) -> bool {
        self.essence == "multipart/form-data"
    }
}

/// Accumulates form values per key, preserving arrival order within a key.
#[derive(Debug, Default)]
struct FormBuilder {
    values: BTreeMap<String, FormValues>,
}

impl FormBuilder {
    fn push(&mut self, key: String, value: String) {
        self.values.entry(key).or_default().push(value);
    }

    fn extend_urlencoded(&mut self, input: &[u8]) {
        for (k, v) in url::form_urlencoded::parse(input) {
            self.push(k.into_owned(), v.into_owned());
        }
    }

    fn finish(self) -> ParamMap {
        self.values
            .into_iter()
            .map(|(k, v)| (k, collapse_values(v)))
            .collect()
    }
}

/// Extract request parameters from a body and its content type.
///
/// JSON bodies ignore the query string; form and multipart bodies append
/// query pairs after the body's own values.
pub fn extract_params(
    content_type: Option<&str>,
    query: Option<&str>,
    body: &[u8],
    config: &BindConfig,
) -> Result<ParamMap, ExtractError> {
    let media = content_type.map(MediaType::parse).unwrap_or_default();

    let params = if media.is_json() {
        parse_json_body(body)?
    } else if media.is_multipart_form() {
        if body.len() > config.max_multipart_bytes {
            return Err(ExtractError::BodyTooLarge {
                size: body.len(),
                limit: config.max_multipart_bytes,
            });
        }
        let boundary = media
            .param("boundary")
            .ok_or(ExtractError::MissingBoundary)?;
        parse_multipart_form(body, boundary, query)?
    } else {
        parse_form_body(body, query)
    };

    debug!(
        content_type = %media.essence,
        body_size_bytes = body.len(),
        param_count = params.len(),
        "Request params extracted"
    );
    Ok(params)
}

/// Parse a JSON body. A blank body yields an empty map.
pub fn parse_json_body(body: &[u8]) -> Result<ParamMap, ExtractError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ParamMap::new());
    }
    let value: Value = serde_json::from_slice(body)?;
    Ok(params_from_json(value))
}

/// Parse an url-encoded body followed by an optional query string.
pub fn parse_form_body(body: &[u8], query: Option<&str>) -> ParamMap {
    let mut form = FormBuilder::default();
    form.extend_urlencoded(body);
    if let Some(query) = query {
        form.extend_urlencoded(query.as_bytes());
    }
    form.finish()
}

fn parse_multipart_form(
    body: &[u8],
    boundary: &str,
    query: Option<&str>,
) -> Result<ParamMap, ExtractError> {
    let mut form = FormBuilder::default();
    let mut files: BTreeMap<String, Vec<Value>> = BTreeMap::new();

    for part in parse_multipart(body, boundary)? {
        match part.filename {
            Some(filename) => files.entry(part.name).or_default().push(json!({
                "filename": filename,
                "content_type": part.content_type,
                "size": part.body.len(),
                "content_base64": STANDARD.encode(part.body),
            })),
            None => form.push(part.name, String::from_utf8_lossy(part.body).into_owned()),
        }
    }
    if let Some(query) = query {
        form.extend_urlencoded(query.as_bytes());
    }

    let mut params = form.finish();
    if !files.is_empty() {
        let files = files
            .into_iter()
            .map(|(name, list)| (name, Value::Array(list)))
            .collect();
        params.insert(FILES_KEY.to_string(), Value::Object(files));
    }
    Ok(params)
}

/// Extract parameters from an [`http::Request`].
pub fn extract_from_request<B>(
    req: &http::Request<B>,
    config: &BindConfig,
) -> Result<ParamMap, ExtractError>
where
    B: AsRef<[u8]>,
{
    let content_type = req
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    extract_params(content_type, req.uri().query(), req.body().as_ref(), config)
}

#[derive(Debug, Clone)]
struct CachedParams(ParamMap);

/// Like [`extract_from_request`], but caches the result in the request's
/// extensions. Later calls return the cached map without re-parsing.
pub fn request_params<B>(
    req: &mut http::Request<B>,
    config: &BindConfig,
) -> Result<ParamMap, ExtractError>
where
    B: AsRef<[u8]>,
{
    if let Some(CachedParams(params)) = req.extensions().get::<CachedParams>() {
        return Ok(params.clone());
    }
    let params = extract_from_request(req, config)?;
    req.extensions_mut().insert(CachedParams(params.clone()));
    Ok(params)
}
