use std::borrow::Cow;
use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::BindConfig;
use crate::convert::{apply_default, convert_value, ConversionRule};
use crate::error::{BindError, MissingFields};
use crate::model::{resolve_field, Field, FieldSlot, Model};
use crate::nullable::NullableRule;
use crate::params::ParamMap;

/// Binds parameter sets onto models.
///
/// ```rust
/// use brrtbind::{BindConfig, Binder, Model};
/// use serde_json::json;
///
/// #[derive(Debug, Default, Model)]
/// pub struct NewPet {
///     pub name: String,
///     pub age: u32,
/// }
///
/// let params = json!({"name": "Fluffy", "age": "3"});
/// let params = params.as_object().unwrap();
///
/// let mut pet = NewPet::default();
/// Binder::new(BindConfig::default()).bind(params, &mut pet).unwrap();
/// assert_eq!(pet.name, "Fluffy");
/// assert_eq!(pet.age, 3);
/// ```
#[derive(Debug)]
pub struct Binder {
    config: BindConfig,
    rules: Vec<Box<dyn ConversionRule>>,
}

impl Default for Binder {
    fn default() -> Self {
        Binder::new(BindConfig::default())
    }
}

#[derive(Default)]
struct BindState {
    matched: usize,
    matched_keys: HashSet<Cow<'static, str>>,
    missing: MissingFields,
}

impl Binder {
    /// Binder with the default special conversion rules ([`NullableRule`]).
    pub fn new(config: BindConfig) -> Self {
        Binder {
            config,
            rules: vec![Box::new(NullableRule)],
        }
    }

    /// Append a special conversion rule. Rules run in insertion order.
    #[must_use]
    pub fn with_rule<R>(mut self, rule: R) -> Self
    where
        R: ConversionRule + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Drop every special conversion rule, leaving only kind-based
    /// conversion and field receivers.
    #[must_use]
    pub fn without_rules(mut self) -> Self {
        self.rules.clear();
        self
    }

    #[must_use]
    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    #[must_use]
    pub fn rules(&self) -> &[Box<dyn ConversionRule>] {
        &self.rules
    }

    /// Bind `params` onto `target`.
    ///
    /// Returns `Ok(())` when every parameter matched a field and no required
    /// field was missing, [`BindError::MissingFields`] when only required
    /// fields were missing, and a hard error otherwise.
    pub fn bind<M>(&self, params: &ParamMap, target: &mut M) -> Result<(), BindError>
    where
        M: Model + ?Sized,
    {
        let mut state = BindState::default();
        self.walk(params, target.fields(), &mut state)?;

        let unmatched: Vec<String> = params
            .keys()
            .filter(|key| !state.matched_keys.contains(key.as_str()))
            .cloned()
            .collect();

        if !unmatched.is_empty() {
            warn!(
                param_count = params.len(),
                matched = state.matched,
                unmatched = ?unmatched,
                "Request has parameters the model does not accept"
            );
            return Err(BindError::UnmatchedParameters {
                params: params.len(),
                matched: state.matched,
                unmatched,
            });
        }

        if state.missing.has_missing_fields() {
            debug!(
                matched = state.matched,
                missing = ?state.missing.names,
                "Model bound with missing fields"
            );
            return Err(state.missing.into());
        }

        debug!(matched = state.matched, "Model bound");
        Ok(())
    }

    fn walk(
        &self,
        params: &ParamMap,
        fields: Vec<Field<'_>>,
        state: &mut BindState,
    ) -> Result<(), BindError> {
        for field in fields {
            let slot = match field.slot {
                FieldSlot::Hidden => continue,
                FieldSlot::Embedded(sub) => {
                    self.walk(params, sub.fields(), state)?;
                    continue;
                }
                FieldSlot::Value(slot) => slot,
            };

            let Some(resolved) = resolve_field(field.meta, self.config.required_by_default) else {
                continue;
            };

            match params.get(&*resolved.key) {
                Some(raw) => {
                    state.matched += 1;
                    debug!(field = field.meta.name, key = %resolved.key, "Field matched");
                    convert_value(slot, raw, &self.rules)
                        .map_err(|err| BindError::from_conversion(&resolved.key, err))?;
                    state.matched_keys.insert(resolved.key);
                }
                None if resolved.required => {
                    debug!(field = field.meta.name, key = %resolved.key, "Required field missing");
                    state.missing.add(resolved.key.into_owned());
                }
                None => {
                    let default = slot.as_default_provider().map(|p| p.default_value());
                    if let Some(value) = default {
                        debug!(field = field.meta.name, key = %resolved.key, "Applying default value");
                        apply_default(slot, &value, &self.rules)
                            .map_err(|err| BindError::from_conversion(&resolved.key, err))?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Bind with a default [`Binder`] (fields required unless `optional`).
pub fn bind<M>(params: &ParamMap, target: &mut M) -> Result<(), BindError>
where
    M: Model + ?Sized,
{
    Binder::default().bind(params, target)
}
