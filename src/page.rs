//! Offset/limit pagination from `page` and `page_size` parameters.
//!
//! Pages are 1-based. A missing `page` means the first page; a missing
//! `page_size` means the caller's default.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::params::ParamMap;

pub const PAGE_KEY: &str = "page";
pub const PAGE_SIZE_KEY: &str = "page_size";

/// Resolved window into a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("invalid value for `{key}`: {value}")]
    Invalid { key: &'static str, value: String },
}

fn invalid(key: &'static str, value: &Value) -> PageError {
    let value = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    PageError::Invalid { key, value }
}

/// Read a non-negative integer parameter. Query-style lists use their first
/// element.
fn read_number(params: &ParamMap, key: &'static str) -> Result<Option<usize>, PageError> {
    let Some(raw) = params.get(key) else {
        return Ok(None);
    };
    let value = match raw {
        Value::Array(items) => match items.first() {
            Some(first) => first,
            None => return Err(invalid(key, raw)),
        },
        other => other,
    };
    let parsed = match value {
        Value::String(s) => s.trim().parse::<usize>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| invalid(key, value))
}

/// Compute the offset and limit requested by `params`.
pub fn parse_page(params: &ParamMap, default_page_size: usize) -> Result<Page, PageError> {
    let limit = read_number(params, PAGE_SIZE_KEY)?.unwrap_or(default_page_size);
    let page = match read_number(params, PAGE_KEY)? {
        Some(0) => {
            return Err(PageError::Invalid {
                key: PAGE_KEY,
                value: "0".to_string(),
            })
        }
        Some(page) => page,
        None => 1,
    };
    let offset = (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| PageError::Invalid {
            key: PAGE_KEY,
            value: page.to_string(),
        })?;
    Ok(Page { offset, limit })
}

/// Like [`parse_page`], but removes the pagination keys from `params` so the
/// rest can be bound onto a model that does not declare them.
pub fn take_page(params: &mut ParamMap, default_page_size: usize) -> Result<Page, PageError> {
    let page = parse_page(params, default_page_size)?;
    params.remove(PAGE_KEY);
    params.remove(PAGE_SIZE_KEY);
    Ok(page)
}
