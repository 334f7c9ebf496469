use crate::capability::Bindable;

/// Tag values attached to a field.
///
/// `request` may carry options after the key: `"name,optional"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tags {
    pub request: Option<&'static str>,
    pub response: Option<&'static str>,
    pub db: Option<&'static str>,
}

impl Tags {
    pub const fn none() -> Self {
        Tags {
            request: None,
            response: None,
            db: None,
        }
    }
}

/// Static description of one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Rust field name
    pub name: &'static str,
    pub tags: Tags,
    /// `pub` fields only; everything else is invisible to the binder
    pub exported: bool,
    /// Sub-record whose fields are flattened into the parent
    pub embedded: bool,
}

impl FieldMeta {
    /// Plain exported field with no tags.
    pub const fn named(name: &'static str) -> Self {
        FieldMeta {
            name,
            tags: Tags::none(),
            exported: true,
            embedded: false,
        }
    }
}

/// Mutable handle on a field's storage.
pub enum FieldSlot<'a> {
    Value(&'a mut (dyn Bindable + 'a)),
    Embedded(&'a mut (dyn Model + 'a)),
    /// Not visible to binding (non-`pub`)
    Hidden,
}

/// A field of a record paired with its metadata.
pub struct Field<'a> {
    pub meta: &'static FieldMeta,
    pub slot: FieldSlot<'a>,
}

impl<'a> Field<'a> {
    pub fn new(meta: &'static FieldMeta, slot: FieldSlot<'a>) -> Self {
        Field { meta, slot }
    }
}

impl std::fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = match self.slot {
            FieldSlot::Value(_) => "value",
            FieldSlot::Embedded(_) => "embedded",
            FieldSlot::Hidden => "hidden",
        };
        f.debug_struct("Field")
            .field("meta", self.meta)
            .field("slot", &slot)
            .finish()
    }
}

/// A record the binder can populate.
///
/// Implemented by `#[derive(Model)]`, or by hand for types that want to
/// register their fields explicitly:
///
/// ```rust
/// use brrtbind::{Field, FieldMeta, FieldSlot, Model};
///
/// #[derive(Default)]
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// impl Model for Point {
///     fn fields(&mut self) -> Vec<Field<'_>> {
///         static X: FieldMeta = FieldMeta::named("x");
///         static Y: FieldMeta = FieldMeta::named("y");
///         vec![
///             Field::new(&X, FieldSlot::Value(&mut self.x)),
///             Field::new(&Y, FieldSlot::Value(&mut self.y)),
///         ]
///     }
/// }
/// ```
pub trait Model {
    /// Every declared field, in declaration order.
    fn fields(&mut self) -> Vec<Field<'_>>;
}
