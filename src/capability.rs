//! Capabilities a field type may implement to customize binding.
//!
//! [`Bindable`] is the one trait every bound field type implements. Its
//! `as_*` methods are capability queries: the binder asks a field whether it
//! is a [`Receiver`], has hooks, or provides a default, and each answers
//! `None` unless the type opted in. `#[derive(Bindable)]` writes those
//! answers for you.

use serde_json::Value;

use crate::error::ConversionError;

/// A type that parses and validates request values itself.
///
/// When a field's type is a receiver, the built-in conversion never runs for
/// it, including for `null`.
///
/// ```rust
/// use brrtbind::{Bindable, Receiver, Value};
///
/// #[derive(Default, Bindable)]
/// #[bindable(receiver)]
/// pub struct Password(String);
///
/// impl Receiver for Password {
///     fn receive(&mut self, raw: &Value) -> anyhow::Result<()> {
///         let plain = raw
///             .as_str()
///             .ok_or_else(|| anyhow::anyhow!("password must be a string"))?;
///         anyhow::ensure!(plain.len() >= 8, "password too short");
///         self.0 = format!("hashed:{}", plain.len());
///         Ok(())
///     }
/// }
/// ```
pub trait Receiver {
    fn receive(&mut self, raw: &Value) -> anyhow::Result<()>;
}

/// Runs right before a present value is converted.
pub trait PreReceive {
    fn pre_receive(&mut self) -> anyhow::Result<()>;
}

/// Runs right after a present value was converted successfully.
pub trait PostReceive {
    fn post_receive(&mut self) -> anyhow::Result<()>;
}

/// Supplies a value for an optional field whose key was absent.
pub trait DefaultValueProvider {
    fn default_value(&self) -> Value;
}

/// The two members of a nullable wrapper: validity flag and inner scalar.
pub struct NullableParts<'a> {
    pub valid: &'a mut bool,
    pub value: &'a mut (dyn Bindable + 'a),
}

/// Contract between the binder and a field's type.
pub trait Bindable {
    /// Short type name (no module path, no generics), used by conversion
    /// rules and error messages.
    fn type_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Built-in conversion for the type's kind.
    fn assign(&mut self, raw: &Value) -> Result<(), ConversionError>;

    /// Whether `null` is a legal value for this type.
    fn accepts_null(&self) -> bool {
        false
    }

    /// Return to the empty state.
    fn reset(&mut self) {}

    fn as_receiver(&mut self) -> Option<&mut dyn Receiver> {
        None
    }

    fn as_pre_receive(&mut self) -> Option<&mut dyn PreReceive> {
        None
    }

    fn as_post_receive(&mut self) -> Option<&mut dyn PostReceive> {
        None
    }

    fn as_default_provider(&self) -> Option<&dyn DefaultValueProvider> {
        None
    }

    fn as_nullable(&mut self) -> Option<NullableParts<'_>> {
        None
    }
}

/// `"core::option::Option<i64>"` -> `"Option"`, `"app::NullMoney"` -> `"NullMoney"`.
#[must_use]
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Name of a JSON value's kind, for error messages.
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
