//! # Model Module
//!
//! Field metadata for bindable records.
//!
//! ## Overview
//!
//! The binder never inspects types at runtime. Instead every record exposes a
//! small descriptor table through the [`Model`] trait: one [`Field`] per
//! declared field, in declaration order, each pairing static metadata
//! ([`FieldMeta`]) with a mutable slot into the record.
//!
//! The table is normally produced by `#[derive(Model)]`:
//!
//! ```rust
//! use brrtbind::Model;
//!
//! #[derive(Default, Model)]
//! pub struct Audit {
//!     pub created_by: String,
//! }
//!
//! #[derive(Default, Model)]
//! pub struct Pet {
//!     pub name: String,
//!     #[bind(request = "kind,optional")]
//!     pub species: String,
//!     #[bind(response = "-")]
//!     pub owner_id: i64,
//!     #[bind(embed)]
//!     pub audit: Audit,
//!     notes: String,
//! }
//! ```
//!
//! ## Key Resolution
//!
//! The external key for a field is the first non-empty of:
//!
//! 1. the name part of the `request` tag
//! 2. the `response` tag
//! 3. the `db` tag, unless it is `"-"`
//! 4. the Rust field name, lower-cased
//!
//! If the winning value is `"-"` the field is skipped entirely. Fields that
//! are not `pub` are never bound. See [`resolve_field`].
//!
//! ## Embedding
//!
//! `#[bind(embed)]` splices the sub-record's fields into the parent's key
//! namespace. The binder recurses into it in place.

mod core;
pub mod tags;

pub use self::core::*;
pub use tags::{parse_tag, resolve_field, FieldOption, ResolvedField};
