//! # Extract Module
//!
//! Turns an HTTP request body into a [`ParamMap`](crate::ParamMap) for the
//! binder.
//!
//! ## Content Types
//!
//! | Content type | Result |
//! |---|---|
//! | `application/json`, `text/json`, `*/*+json` | object keys; other JSON values under `"body"` |
//! | `application/x-www-form-urlencoded` | body pairs, then query pairs |
//! | `multipart/form-data` | text parts and query pairs; file parts under `"files"` |
//! | anything else / missing | treated as a form body |
//!
//! Form keys with a single value collapse to a bare string; repeated keys
//! stay a list. The binder never sees an un-collapsed single value.
//!
//! ## Caching
//!
//! [`request_params`] stores the extracted map in the request's extensions,
//! so middleware and handlers can both ask for it without parsing twice.

mod core;
pub mod multipart;

pub use self::core::*;
pub use multipart::{parse_multipart, Part};
