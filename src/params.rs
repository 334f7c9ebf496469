//! The parameter set handed to the binder.

use serde_json::{Map, Value};
use smallvec::SmallVec;

/// Untyped request parameters: string key to JSON value.
pub type ParamMap = Map<String, Value>;

/// Values seen for one form key. Almost always a single entry.
pub type FormValues = SmallVec<[String; 1]>;

/// Collapse a form key's values: one value becomes a bare string, several
/// stay a list. The binder relies on this having happened upstream.
#[must_use]
pub fn collapse_values(mut values: FormValues) -> Value {
    if values.len() == 1 {
        Value::String(values.remove(0))
    } else {
        Value::Array(values.into_iter().map(Value::String).collect())
    }
}

/// Build a [`ParamMap`] from a JSON value. Objects are used as-is; anything
/// else is stored under `"body"`.
#[must_use]
pub fn params_from_json(value: Value) -> ParamMap {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = ParamMap::new();
            map.insert("body".to_string(), other);
            map
        }
    }
}
