//! Value conversion: turning one untyped parameter into a typed field.
//!
//! Order for a present value:
//!
//! 1. `PreReceive` hook, if the field has one
//! 2. `Receiver`, if the field has one; nothing built-in runs after it
//! 3. otherwise: reject `null` unless the type accepts it, try the special
//!    [`ConversionRule`]s in order, then fall back to [`Bindable::assign`]
//! 4. `PostReceive` hook, if the field has one
//!
//! Built-in `assign` implementations for scalar kinds live here too.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::capability::{value_kind, Bindable};
use crate::error::ConversionError;

/// A special conversion tried before the kind-based `assign`.
///
/// `apply` returns `None` when the rule does not recognise the slot, so the
/// next rule (or the built-in conversion) gets a turn.
pub trait ConversionRule: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn apply(&self, slot: &mut dyn Bindable, raw: &Value) -> Option<Result<(), ConversionError>>;
}

/// Convert a present value into `slot`, running receive hooks around it.
pub fn convert_value(
    slot: &mut dyn Bindable,
    raw: &Value,
    rules: &[Box<dyn ConversionRule>],
) -> Result<(), ConversionError> {
    if let Some(hook) = slot.as_pre_receive() {
        hook.pre_receive().map_err(ConversionError::Hook)?;
    }

    receive_value(slot, raw, rules)?;

    if let Some(hook) = slot.as_post_receive() {
        hook.post_receive().map_err(ConversionError::Hook)?;
    }
    Ok(())
}

/// Store a value from a `DefaultValueProvider`. No hooks run.
pub fn apply_default(
    slot: &mut dyn Bindable,
    value: &Value,
    rules: &[Box<dyn ConversionRule>],
) -> Result<(), ConversionError> {
    receive_value(slot, value, rules)
}

fn receive_value(
    slot: &mut dyn Bindable,
    raw: &Value,
    rules: &[Box<dyn ConversionRule>],
) -> Result<(), ConversionError> {
    if let Some(receiver) = slot.as_receiver() {
        return receiver.receive(raw).map_err(ConversionError::Hook);
    }

    if raw.is_null() && !slot.accepts_null() {
        return Err(ConversionError::NullNotAllowed {
            type_name: slot.type_name(),
        });
    }

    for rule in rules {
        if let Some(result) = rule.apply(slot, raw) {
            return result;
        }
    }

    slot.assign(raw)
}

/// `assign` for types that deserialize with serde. Used by
/// `#[bindable(serde)]`.
pub fn deserialize_into<T>(slot: &mut T, raw: &Value) -> Result<(), ConversionError>
where
    T: DeserializeOwned + Bindable,
{
    let type_name = slot.type_name();
    *slot = T::deserialize(raw)
        .map_err(|source| ConversionError::Deserialize { type_name, source })?;
    Ok(())
}

/// Integer coercion: decimal strings, integers, and floats (truncated).
pub fn coerce_integer<T>(raw: &Value, type_name: &'static str) -> Result<T, ConversionError>
where
    T: TryFrom<i128>,
{
    let wide = match raw {
        Value::String(s) => s
            .parse::<i128>()
            .map_err(|source| ConversionError::InvalidInteger {
                value: s.clone(),
                source,
            })?,
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i128))
            .ok_or(ConversionError::Incompatible {
                found: "number",
                type_name,
            })?,
        other => {
            return Err(ConversionError::Incompatible {
                found: value_kind(other),
                type_name,
            })
        }
    };
    T::try_from(wide).map_err(|_| ConversionError::OutOfRange {
        value: wide.to_string(),
        type_name,
    })
}

/// Float coercion: float strings, integers, floats.
pub fn coerce_float(raw: &Value, type_name: &'static str) -> Result<f64, ConversionError> {
    match raw {
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|source| ConversionError::InvalidFloat {
                value: s.clone(),
                source,
            }),
        Value::Number(n) => n.as_f64().ok_or(ConversionError::Incompatible {
            found: "number",
            type_name,
        }),
        other => Err(ConversionError::Incompatible {
            found: value_kind(other),
            type_name,
        }),
    }
}

macro_rules! impl_integer {
    ($($t:ty),* $(,)?) => {
        $(
            impl Bindable for $t {
                fn type_name(&self) -> &'static str {
                    stringify!($t)
                }

                fn assign(&mut self, raw: &Value) -> Result<(), ConversionError> {
                    *self = coerce_integer::<$t>(raw, stringify!($t))?;
                    Ok(())
                }

                fn reset(&mut self) {
                    *self = 0;
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Bindable for f64 {
    fn type_name(&self) -> &'static str {
        "f64"
    }

    fn assign(&mut self, raw: &Value) -> Result<(), ConversionError> {
        *self = coerce_float(raw, "f64")?;
        Ok(())
    }

    fn reset(&mut self) {
        *self = 0.0;
    }
}

impl Bindable for f32 {
    fn type_name(&self) -> &'static str {
        "f32"
    }

    fn assign(&mut self, raw: &Value) -> Result<(), ConversionError> {
        let wide = coerce_float(raw, "f32")?;
        let narrow = wide as f32;
        if wide.is_finite() && !narrow.is_finite() {
            return Err(ConversionError::OutOfRange {
                value: wide.to_string(),
                type_name: "f32",
            });
        }
        *self = narrow;
        Ok(())
    }

    fn reset(&mut self) {
        *self = 0.0;
    }
}

impl Bindable for bool {
    fn type_name(&self) -> &'static str {
        "bool"
    }

    fn assign(&mut self, raw: &Value) -> Result<(), ConversionError> {
        match raw {
            Value::Bool(b) => {
                *self = *b;
                Ok(())
            }
            other => Err(ConversionError::Incompatible {
                found: value_kind(other),
                type_name: "bool",
            }),
        }
    }

    fn reset(&mut self) {
        *self = false;
    }
}

impl Bindable for String {
    fn type_name(&self) -> &'static str {
        "String"
    }

    fn assign(&mut self, raw: &Value) -> Result<(), ConversionError> {
        match raw {
            Value::String(s) => {
                self.clone_from(s);
                Ok(())
            }
            other => Err(ConversionError::Incompatible {
                found: value_kind(other),
                type_name: "String",
            }),
        }
    }

    fn reset(&mut self) {
        self.clear();
    }
}

/// Raw passthrough: any value, `null` included.
impl Bindable for Value {
    fn type_name(&self) -> &'static str {
        "Value"
    }

    fn assign(&mut self, raw: &Value) -> Result<(), ConversionError> {
        self.clone_from(raw);
        Ok(())
    }

    fn accepts_null(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        *self = Value::Null;
    }
}

/// `null` clears to `None`; anything else converts into a fresh `T`.
///
/// The inner conversion sees no [`ConversionRule`]s and runs no receive
/// hooks, so `Option` does not compose with the `Null*` wrappers:
/// `Option<NullInt64>` fails with `Unsupported`. Use the wrapper alone.
impl<T> Bindable for Option<T>
where
    T: Bindable + Default,
{
    fn type_name(&self) -> &'static str {
        "Option"
    }

    fn assign(&mut self, raw: &Value) -> Result<(), ConversionError> {
        if raw.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        receive_value(&mut inner, raw, &[])?;
        *self = Some(inner);
        Ok(())
    }

    fn accepts_null(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        *self = None;
    }
}
