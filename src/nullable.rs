//! Nullable wrappers in the `Null<Scalar>` style used by SQL drivers.
//!
//! Each wrapper holds the scalar plus a `valid` flag. [`NullableRule`] picks
//! up any field type whose short name starts with `Null` and exposes
//! [`Bindable::as_nullable`]: `null` clears it, anything else sets `valid`
//! and converts into the inner scalar. User types can join in with
//! `#[bindable(nullable(value = "..."))]`.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::capability::{Bindable, NullableParts};
use crate::convert::ConversionRule;
use crate::error::ConversionError;

/// Type-name prefix that marks a nullable wrapper.
pub const NULLABLE_PREFIX: &str = "Null";

macro_rules! nullable {
    ($(#[$doc:meta])* $name:ident, $field:ident, $ty:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub $field: $ty,
            pub valid: bool,
        }

        impl $name {
            pub fn new(value: $ty) -> Self {
                Self {
                    $field: value,
                    valid: true,
                }
            }

            pub fn null() -> Self {
                Self::default()
            }

            #[must_use]
            pub fn get(&self) -> Option<&$ty> {
                self.valid.then_some(&self.$field)
            }
        }

        impl From<Option<$ty>> for $name {
            fn from(value: Option<$ty>) -> Self {
                value.map(Self::new).unwrap_or_default()
            }
        }

        impl Bindable for $name {
            fn type_name(&self) -> &'static str {
                stringify!($name)
            }

            // Only reachable when NullableRule was removed from the binder.
            fn assign(&mut self, _raw: &Value) -> Result<(), ConversionError> {
                Err(ConversionError::Unsupported {
                    type_name: stringify!($name),
                })
            }

            fn accepts_null(&self) -> bool {
                true
            }

            fn reset(&mut self) {
                *self = Self::default();
            }

            fn as_nullable(&mut self) -> Option<NullableParts<'_>> {
                Some(NullableParts {
                    valid: &mut self.valid,
                    value: &mut self.$field,
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if self.valid {
                    self.$field.serialize(serializer)
                } else {
                    serializer.serialize_none()
                }
            }
        }
    };
}

nullable!(
    /// Nullable `String`
    NullString, string, String
);
nullable!(
    /// Nullable `i64`
    NullInt64, int64, i64
);
nullable!(
    /// Nullable `i32`
    NullInt32, int32, i32
);
nullable!(
    /// Nullable `i16`
    NullInt16, int16, i16
);
nullable!(
    /// Nullable `u8`
    NullByte, byte, u8
);
nullable!(
    /// Nullable `f64`
    NullFloat64, float64, f64
);
nullable!(
    /// Nullable `bool`
    NullBool, bool, bool
);

/// Conversion rule for `Null*` wrapper types.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullableRule;

impl ConversionRule for NullableRule {
    fn name(&self) -> &'static str {
        "nullable"
    }

    fn apply(&self, slot: &mut dyn Bindable, raw: &Value) -> Option<Result<(), ConversionError>> {
        let scalar = slot.type_name().strip_prefix(NULLABLE_PREFIX)?;
        if scalar.is_empty() {
            return None;
        }
        let parts = slot.as_nullable()?;

        if raw.is_null() {
            *parts.valid = false;
            parts.value.reset();
            return Some(Ok(()));
        }

        let result = parts.value.assign(raw);
        if result.is_ok() {
            *parts.valid = true;
        }
        Some(result)
    }
}
