//! Tag parsing and external key resolution.

use std::borrow::Cow;

use tracing::debug;

use super::FieldMeta;

/// Tag value meaning "exclude this field from binding".
pub const SKIP: &str = "-";

/// Options recognised after the key in a `request` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOption {
    Optional,
    Required,
}

impl FieldOption {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "optional" => Some(FieldOption::Optional),
            "required" => Some(FieldOption::Required),
            _ => None,
        }
    }
}

/// Key and requiredness of a field that takes part in binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub key: Cow<'static, str>,
    pub required: bool,
}

/// Split a tag into its name and options.
///
/// Runs of commas between options collapse, so `"name,,optional"` has one
/// option.
pub fn parse_tag(tag: &str) -> (&str, impl Iterator<Item = &str>) {
    let mut parts = tag.split(',');
    let name = parts.next().unwrap_or("");
    (name, parts.filter(|p| !p.is_empty()))
}

/// Resolve a field's external key and whether it is required.
///
/// Returns `None` when the field does not take part in binding at all:
/// it is not exported, or the winning tag value is `"-"`.
pub fn resolve_field(meta: &FieldMeta, required_by_default: bool) -> Option<ResolvedField> {
    if !meta.exported {
        return None;
    }

    let (request_name, options) = match meta.tags.request {
        Some(tag) => {
            let (name, options) = parse_tag(tag);
            (name, options.collect::<Vec<_>>())
        }
        None => ("", Vec::new()),
    };

    // db "-" means "not persisted", which says nothing about requests.
    let db = meta.tags.db.filter(|d| *d != SKIP);

    let key = [Some(request_name), meta.tags.response, db]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty());

    let key: Cow<'static, str> = match key {
        Some(SKIP) => return None,
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(meta.name.to_lowercase()),
    };

    let mut required = required_by_default;
    for option in options {
        match FieldOption::parse(option) {
            Some(FieldOption::Optional) => required = false,
            Some(FieldOption::Required) => required = true,
            None => debug!(field = meta.name, option = option, "Ignoring unknown field option"),
        }
    }

    Some(ResolvedField { key, required })
}
