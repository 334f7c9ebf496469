//! Typed request conversion: extract a request's parameters and bind them
//! onto a fresh model in one step.

use thiserror::Error;
use tracing::debug;

use crate::binder::Binder;
use crate::error::{BindError, BindResultExt};
use crate::extract::{extract_from_request, ExtractError};
use crate::model::Model;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Bind(#[from] BindError),
}

impl RequestError {
    /// Whether the request was rejected only for missing required fields.
    #[must_use]
    pub fn is_missing_fields(&self) -> bool {
        matches!(self, RequestError::Bind(err) if err.is_missing_fields())
    }
}

/// Build a `T` from the request's parameters.
///
/// ```rust
/// use brrtbind::{request::bind_request, Binder, Model};
///
/// #[derive(Debug, Default, Model)]
/// pub struct Login {
///     pub user: String,
///     #[bind(request = "pass")]
///     pub password: String,
/// }
///
/// let req = http::Request::builder()
///     .header("content-type", "application/json")
///     .body(r#"{"user": "ada", "pass": "hunter2"}"#)
///     .unwrap();
/// let login: Login = bind_request(&req, &Binder::default()).unwrap();
/// assert_eq!(login.password, "hunter2");
/// ```
pub fn bind_request<T, B>(req: &http::Request<B>, binder: &Binder) -> Result<T, RequestError>
where
    T: Model + Default,
    B: AsRef<[u8]>,
{
    let params = extract_from_request(req, binder.config())?;
    let mut target = T::default();
    binder.bind(&params, &mut target)?;
    Ok(target)
}

/// Like [`bind_request`], but missing required fields are not an error.
/// Suited to partial updates.
pub fn bind_request_partial<T, B>(
    req: &http::Request<B>,
    binder: &Binder,
) -> Result<T, RequestError>
where
    T: Model + Default,
    B: AsRef<[u8]>,
{
    let params = extract_from_request(req, binder.config())?;
    let mut target = T::default();
    binder.bind(&params, &mut target).allow_missing()?;
    debug!(param_count = params.len(), "Partial request bound");
    Ok(target)
}
