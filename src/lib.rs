//! # brrtbind
//!
//! **brrtbind** copies untyped request parameters onto typed Rust models.
//!
//! ## Overview
//!
//! A request arrives as a map of string keys to loosely typed values
//! (`"age": "3"`, `"tags": ["a", "b"]`, `"nickname": null`). brrtbind walks
//! a model's fields, resolves each field's parameter key from its tags,
//! converts the value to the field's declared type and stores it. It then
//! reports required fields that were missing and parameters that no field
//! accepted.
//!
//! ## Architecture
//!
//! - **[`model`]** - field descriptors and tag-precedence key resolution
//! - **[`capability`]** - per-field hooks: receivers, pre/post receive, defaults
//! - **[`convert`]** - value conversion and the special-rule list
//! - **[`nullable`]** - `Null*` wrappers and the rule that fills them
//! - **[`binder`]** - the binding engine
//! - **[`extract`]** - JSON, form and multipart bodies into a [`ParamMap`]
//! - **[`request`]** - extract and bind an [`http::Request`] in one call
//! - **[`page`]** - `page`/`page_size` pagination
//! - **[`config`]** and **[`logging`]** - environment-driven setup
//!
//! ### Binding Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Handler
//!     participant Extract as extract
//!     participant Binder
//!     participant Model
//!
//!     Handler->>Extract: extract_from_request(&req, &config)
//!     Extract->>Extract: parse JSON / form / multipart
//!     Extract-->>Handler: ParamMap
//!     Handler->>Binder: bind(&params, &mut model)
//!     Binder->>Model: fields()
//!     Model-->>Binder: Vec<Field>
//!     loop each field
//!         Binder->>Binder: resolve key from tags
//!         Binder->>Model: convert and store value
//!     end
//!     Binder-->>Handler: Ok(()) / MissingFields / hard error
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtbind::{bind, BindError, Model, NullString};
//! use serde_json::json;
//!
//! #[derive(Debug, Default, Model)]
//! pub struct Signup {
//!     #[bind(request = "email,required")]
//!     pub email: String,
//!     #[bind(request = "nick,optional")]
//!     pub nickname: NullString,
//!     pub age: u8,
//! }
//!
//! let params = json!({"email": "a@b.c", "nick": null, "age": "30"});
//! let mut signup = Signup::default();
//! bind(params.as_object().unwrap(), &mut signup).unwrap();
//! assert_eq!(signup.age, 30);
//! assert!(!signup.nickname.valid);
//!
//! let params = json!({"nick": "ann"});
//! let err = bind(params.as_object().unwrap(), &mut Signup::default()).unwrap_err();
//! assert!(matches!(err, BindError::MissingFields(_)));
//! assert_eq!(err.to_string(), "missing value for fields: email,age");
//! ```
//!
//! ## Field Tags
//!
//! | Attribute | Meaning |
//! |---|---|
//! | `#[bind(request = "key,optional")]` | parameter key and options; wins over the others |
//! | `#[bind(response = "key")]` | used when no request tag is set |
//! | `#[bind(db = "key")]` | used when neither of the above is set |
//! | `#[bind(skip)]` | same as `request = "-"`: never bound |
//! | `#[bind(embed)]` | flatten a sub-record's fields into this one |
//!
//! With no tags the key is the lower-cased field name.
//!
//! ## Field Capabilities
//!
//! Field types implement [`Bindable`]. Scalars, `String`, `Option<T>` and
//! [`serde_json::Value`] come built in; custom types use
//! `#[derive(Bindable)]` and opt into hooks:
//!
//! ```rust
//! use brrtbind::{Bindable, Receiver, Value};
//!
//! #[derive(Debug, Default, Bindable)]
//! #[bindable(receiver)]
//! pub struct Csv(pub Vec<String>);
//!
//! impl Receiver for Csv {
//!     fn receive(&mut self, value: &Value) -> anyhow::Result<()> {
//!         let text = value.as_str().unwrap_or_default();
//!         self.0 = text.split(',').map(str::to_string).collect();
//!         Ok(())
//!     }
//! }
//! ```

extern crate self as brrtbind;

pub mod binder;
pub mod capability;
pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod logging;
pub mod model;
pub mod nullable;
pub mod page;
pub mod params;
pub mod request;

pub use binder::{bind, Binder};
pub use capability::{
    Bindable, DefaultValueProvider, NullableParts, PostReceive, PreReceive, Receiver,
};
pub use config::BindConfig;
pub use convert::ConversionRule;
pub use error::{BindError, BindResultExt, ConversionError, MissingFields};
pub use extract::{extract_from_request, extract_params, request_params, ExtractError};
pub use model::{Field, FieldMeta, FieldSlot, Model, Tags};
pub use nullable::{
    NullBool, NullByte, NullFloat64, NullInt16, NullInt32, NullInt64, NullString, NullableRule,
};
pub use page::{parse_page, take_page, Page, PageError};
pub use params::ParamMap;
pub use request::{bind_request, bind_request_partial, RequestError};
pub use serde_json::Value;

pub use brrtbind_macros::{Bindable, Model};
