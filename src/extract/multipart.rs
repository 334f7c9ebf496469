//! Minimal in-memory `multipart/form-data` parser.
//!
//! Parts borrow their bodies from the request buffer. The caller enforces
//! the size limit before parsing.

use super::ExtractError;

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part<'a> {
    /// `name` from `Content-Disposition`
    pub name: String,
    /// `filename` from `Content-Disposition`; set for file uploads
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub body: &'a [u8],
}

impl Part<'_> {
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }
}

fn malformed(reason: &str) -> ExtractError {
    ExtractError::Multipart(reason.to_string())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Earliest match of either needle, with the length of the one that matched.
fn find_either(haystack: &[u8], a: &[u8], b: &[u8]) -> Option<(usize, usize)> {
    match (find(haystack, a), find(haystack, b)) {
        (Some(x), Some(y)) if y < x => Some((y, b.len())),
        (Some(x), _) => Some((x, a.len())),
        (None, Some(y)) => Some((y, b.len())),
        (None, None) => None,
    }
}

fn line_break_len(bytes: &[u8]) -> Option<usize> {
    if bytes.starts_with(b"\r\n") {
        Some(2)
    } else if bytes.starts_with(b"\n") {
        Some(1)
    } else {
        None
    }
}

/// Split a multipart body into its parts.
pub fn parse_multipart<'a>(body: &'a [u8], boundary: &str) -> Result<Vec<Part<'a>>, ExtractError> {
    if boundary.is_empty() {
        return Err(ExtractError::MissingBoundary);
    }
    let delimiter = format!("--{boundary}");
    let crlf_delimiter = format!("\r\n--{boundary}");
    let lf_delimiter = format!("\n--{boundary}");

    let mut pos = find(body, delimiter.as_bytes())
        .ok_or_else(|| malformed("opening boundary not found"))?
        + delimiter.len();
    let mut parts = Vec::new();

    loop {
        let rest = &body[pos..];
        if rest.starts_with(b"--") {
            break;
        }
        // transport padding after the boundary is allowed
        let padding = rest
            .iter()
            .take_while(|b| **b == b' ' || **b == b'\t')
            .count();
        let header_start = pos
            + padding
            + line_break_len(&rest[padding..])
                .ok_or_else(|| malformed("expected line break after boundary"))?;

        let (headers_len, separator_len) = match line_break_len(&body[header_start..]) {
            Some(len) => (0, len),
            None => find_either(&body[header_start..], b"\r\n\r\n", b"\n\n")
                .ok_or_else(|| malformed("unterminated part headers"))?,
        };
        let headers = std::str::from_utf8(&body[header_start..header_start + headers_len])
            .map_err(|_| malformed("part headers are not UTF-8"))?;

        let content_start = header_start + headers_len + separator_len;
        let (content_len, delimiter_len) = find_either(
            &body[content_start..],
            crlf_delimiter.as_bytes(),
            lf_delimiter.as_bytes(),
        )
        .ok_or_else(|| malformed("missing closing boundary"))?;

        parts.push(parse_part(
            headers,
            &body[content_start..content_start + content_len],
        )?);
        pos = content_start + content_len + delimiter_len;
    }

    Ok(parts)
}

fn parse_part<'a>(headers: &str, body: &'a [u8]) -> Result<Part<'a>, ExtractError> {
    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    for line in headers.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| malformed("part header without ':'"))?;
        match key.trim().to_ascii_lowercase().as_str() {
            "content-disposition" => {
                for param in value.split(';').skip(1) {
                    let Some((pk, pv)) = param.split_once('=') else {
                        continue;
                    };
                    match pk.trim().to_ascii_lowercase().as_str() {
                        "name" => name = Some(unquote(pv.trim())),
                        "filename" => filename = Some(unquote(pv.trim())),
                        _ => {}
                    }
                }
            }
            "content-type" => content_type = Some(value.trim().to_string()),
            _ => {}
        }
    }

    Ok(Part {
        name: name.ok_or_else(|| malformed("part without a name"))?,
        filename,
        content_type,
        body,
    })
}

pub(crate) fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
