//! Error types returned by the binder.
//!
//! [`BindError::MissingFields`] is the only soft outcome: every parameter
//! landed on a field, but some required fields got nothing. Callers doing
//! partial updates can drop it with [`BindResultExt::allow_missing`].
//! Every other variant is a hard error.

use thiserror::Error;

/// Required fields that had no matching parameter, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("missing value for fields: {}", .names.join(","))]
pub struct MissingFields {
    /// Resolved keys of the required fields that were absent.
    pub names: Vec<String>,
}

impl MissingFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a required key that was absent from the request.
    pub fn add(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    #[must_use]
    pub fn has_missing_fields(&self) -> bool {
        !self.names.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Why a present value could not be stored in its field.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// String value was not a decimal integer
    #[error("invalid integer {value:?}: {source}")]
    InvalidInteger {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    /// String value was not a float
    #[error("invalid float {value:?}: {source}")]
    InvalidFloat {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    /// Numeric value does not fit the field's integer kind
    #[error("value {value} out of range for {type_name}")]
    OutOfRange {
        value: String,
        type_name: &'static str,
    },
    /// `null` sent for a field that is neither `Option` nor a nullable wrapper
    #[error("null is not allowed for {type_name}")]
    NullNotAllowed { type_name: &'static str },
    /// Value kind is not assignable to the field's type
    #[error("cannot convert {found} to {type_name}")]
    Incompatible {
        found: &'static str,
        type_name: &'static str,
    },
    /// Field type has no built-in conversion and no receiver
    #[error("{type_name} has no built-in conversion; implement Receiver for it")]
    Unsupported { type_name: &'static str },
    /// serde-backed conversion failed
    #[error("cannot deserialize {type_name}: {source}")]
    Deserialize {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// A receive hook rejected the value
    #[error("{0}")]
    Hook(anyhow::Error),
}

/// Error returned by [`crate::Binder::bind`].
#[derive(Debug, Error)]
pub enum BindError {
    /// Soft: all parameters matched, some required fields were absent.
    #[error(transparent)]
    MissingFields(#[from] MissingFields),

    /// A value could not be converted to its field's declared type.
    #[error("cannot bind field '{key}': {source}")]
    Conversion {
        key: String,
        #[source]
        source: ConversionError,
    },

    /// A Receiver, PreReceive or PostReceive hook failed. Shown verbatim.
    #[error("{cause}")]
    Hook { key: String, cause: anyhow::Error },

    /// The request carried parameters the model has no field for.
    #[error(
        "more parameters passed than this model has fields: {matched} of {params} matched, unmatched: {}",
        .unmatched.join(",")
    )]
    UnmatchedParameters {
        params: usize,
        matched: usize,
        unmatched: Vec<String>,
    },
}

impl BindError {
    pub(crate) fn from_conversion(key: &str, err: ConversionError) -> Self {
        match err {
            ConversionError::Hook(cause) => BindError::Hook {
                key: key.to_string(),
                cause,
            },
            source => BindError::Conversion {
                key: key.to_string(),
                source,
            },
        }
    }

    #[must_use]
    pub fn is_missing_fields(&self) -> bool {
        matches!(self, BindError::MissingFields(_))
    }

    #[must_use]
    pub fn missing_fields(&self) -> Option<&MissingFields> {
        match self {
            BindError::MissingFields(m) => Some(m),
            _ => None,
        }
    }

    /// Key of the field that failed, for per-field errors.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            BindError::Conversion { key, .. } | BindError::Hook { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Helpers on the result of a bind call.
pub trait BindResultExt {
    /// Treat [`BindError::MissingFields`] as success (PATCH-style requests).
    fn allow_missing(self) -> Result<(), BindError>;
}

impl BindResultExt for Result<(), BindError> {
    fn allow_missing(self) -> Result<(), BindError> {
        match self {
            Err(BindError::MissingFields(_)) => Ok(()),
            other => other,
        }
    }
}
