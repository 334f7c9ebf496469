//! # Binder Module
//!
//! The binding engine: walks a [`Model`](crate::Model)'s fields, matches
//! each resolved key against the [`ParamMap`](crate::ParamMap), converts
//! and stores values, and accounts for missing and unmatched parameters.
//!
//! ## Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Binder
//!     participant Tags as model::tags
//!     participant Convert as convert
//!     participant Field as Field type
//!
//!     Caller->>Binder: bind(params, &mut target)
//!     loop every field, depth-first, declaration order
//!         alt embedded
//!             Binder->>Binder: recurse into sub-record
//!         else value field
//!             Binder->>Tags: resolve_field(meta, required_by_default)
//!             alt skipped ("-" or not pub)
//!                 Tags-->>Binder: None
//!             else key present in params
//!                 Binder->>Convert: convert_value(slot, raw, rules)
//!                 Convert->>Field: pre_receive / receive or assign / post_receive
//!                 alt conversion failed
//!                     Binder-->>Caller: Err(Conversion | Hook)
//!                 end
//!             else key absent and required
//!                 Binder->>Binder: record missing key
//!             else key absent and optional
//!                 Binder->>Field: default_value() if provided
//!             end
//!         end
//!     end
//!     alt params left unmatched
//!         Binder-->>Caller: Err(UnmatchedParameters)
//!     else required fields missing
//!         Binder-->>Caller: Err(MissingFields)
//!     else
//!         Binder-->>Caller: Ok(())
//!     end
//! ```
//!
//! ## Failure Semantics
//!
//! A conversion error stops the walk immediately. Fields bound before the
//! error keep their new values; nothing is rolled back.
//!
//! ## Concurrency
//!
//! A [`Binder`] holds only its configuration and conversion rules, both
//! read-only once built. Share one across threads and call `bind` on
//! distinct targets in parallel.

mod core;

pub use self::core::*;
