use brrtbind::{
    bind, BindConfig, BindError, BindResultExt, Bindable, Binder, ConversionError,
    DefaultValueProvider, Model, NullInt64, NullString, ParamMap, PostReceive, PreReceive,
    Receiver, Value,
};
use brrtbind::convert::coerce_integer;
use serde::Deserialize;
use std::cell::Cell;
use serde_json::json;

fn params(value: Value) -> ParamMap {
    value.as_object().cloned().expect("params must be an object")
}

// ============================================================================
// Models
// ============================================================================

#[derive(Debug, Default, Model)]
pub struct Pet {
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub vaccinated: bool,
}

#[derive(Debug, Default, Model)]
pub struct Audit {
    #[bind(request = "created_by")]
    pub created_by: String,
    pub revision: i32,
}

#[derive(Debug, Default, Model)]
pub struct Document {
    pub title: String,
    #[bind(embed)]
    pub audit: Audit,
}

#[derive(Debug, Default, Model)]
pub struct Tagged {
    #[bind(request = "user_name")]
    pub name: String,
    #[bind(response = "mail")]
    pub email: String,
    #[bind(db = "zip_code")]
    pub zip: String,
    #[bind(skip)]
    pub internal: i64,
    #[bind(request = "-")]
    pub also_internal: i64,
    secret: String,
}

#[derive(Debug, Default, Model)]
pub struct Options {
    #[bind(request = "name,optional")]
    pub name: String,
    #[bind(request = "nick,required")]
    pub nick: String,
}

#[derive(Debug, Default, Model)]
pub struct Nullables {
    pub count: NullInt64,
    #[bind(request = "label,optional")]
    pub label: NullString,
    #[bind(request = "note,optional")]
    pub note: Option<String>,
}

#[derive(Debug, Default, Model)]
#[allow(non_snake_case)]
pub struct Legacy {
    pub UserName: String,
    #[bind(db = "-")]
    pub Region: String,
}

// ============================================================================
// Field types with capabilities
// ============================================================================

/// Stores twice the received integer, so the built-in path is detectable.
#[derive(Debug, Default, Bindable)]
#[bindable(receiver)]
pub struct Doubled {
    pub value: i64,
    pub saw_null: bool,
}

impl Receiver for Doubled {
    fn receive(&mut self, raw: &Value) -> anyhow::Result<()> {
        if raw.is_null() {
            self.saw_null = true;
            return Ok(());
        }
        let n = raw
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("doubled wants an integer"))?;
        self.value = n * 2;
        Ok(())
    }
}

#[derive(Debug, Default, Bindable)]
#[bindable(receiver)]
pub struct Password(pub String);

impl Receiver for Password {
    fn receive(&mut self, raw: &Value) -> anyhow::Result<()> {
        let plain = raw.as_str().unwrap_or_default();
        anyhow::ensure!(plain.len() >= 8, "password too short");
        self.0 = format!("hashed:{}", plain.len());
        Ok(())
    }
}

/// Hand-written `Bindable`: plain string conversion plus both hooks.
#[derive(Debug, Default)]
pub struct Counted {
    pub text: String,
    pub pre: u32,
    pub post: u32,
}

impl Bindable for Counted {
    fn assign(&mut self, raw: &Value) -> Result<(), ConversionError> {
        self.text = raw
            .as_str()
            .ok_or(ConversionError::Incompatible {
                found: "non-string",
                type_name: "Counted",
            })?
            .to_string();
        Ok(())
    }

    fn as_pre_receive(&mut self) -> Option<&mut dyn PreReceive> {
        Some(self)
    }

    fn as_post_receive(&mut self) -> Option<&mut dyn PostReceive> {
        Some(self)
    }
}

impl PreReceive for Counted {
    fn pre_receive(&mut self) -> anyhow::Result<()> {
        self.pre += 1;
        Ok(())
    }
}

impl PostReceive for Counted {
    fn post_receive(&mut self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.text.is_empty(), "text must not be empty");
        self.post += 1;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, Bindable)]
#[bindable(serde, default_value)]
pub struct Color(pub String);

impl DefaultValueProvider for Color {
    fn default_value(&self) -> Value {
        json!("blue")
    }
}

#[derive(Debug, Default, Bindable)]
#[bindable(nullable(value = "cents"))]
pub struct NullMoney {
    pub cents: i64,
    pub valid: bool,
}

/// Refuses every value before conversion.
#[derive(Debug, Default)]
pub struct Gate {
    pub value: i64,
    pub pre: u32,
}

impl Bindable for Gate {
    fn assign(&mut self, raw: &Value) -> Result<(), ConversionError> {
        self.value = coerce_integer(raw, "Gate")?;
        Ok(())
    }

    fn as_pre_receive(&mut self) -> Option<&mut dyn PreReceive> {
        Some(self)
    }
}

impl PreReceive for Gate {
    fn pre_receive(&mut self) -> anyhow::Result<()> {
        self.pre += 1;
        anyhow::bail!("locked")
    }
}

#[derive(Debug, Default, Model)]
pub struct Vault {
    pub gate: Gate,
    pub contents: String,
}

/// Integer with a default of 7 that counts how often it was asked.
#[derive(Debug, Default)]
pub struct Fallback {
    pub value: i64,
    pub calls: Cell<u32>,
}

impl Bindable for Fallback {
    fn assign(&mut self, raw: &Value) -> Result<(), ConversionError> {
        self.value = coerce_integer(raw, "Fallback")?;
        Ok(())
    }

    fn as_default_provider(&self) -> Option<&dyn DefaultValueProvider> {
        Some(self)
    }
}

impl DefaultValueProvider for Fallback {
    fn default_value(&self) -> Value {
        self.calls.set(self.calls.get() + 1);
        json!(7)
    }
}

#[derive(Debug, Default, Model)]
pub struct Limits {
    #[bind(request = "soft,optional")]
    pub soft: Fallback,
    #[bind(request = "hard,required")]
    pub hard: Fallback,
}

#[derive(Debug, Default, Model)]
pub struct Account {
    #[bind(request = "factor,optional")]
    pub factor: Doubled,
    #[bind(request = "password,optional")]
    pub password: Password,
    #[bind(request = "bio,optional")]
    pub bio: Counted,
    #[bind(request = "color,optional")]
    pub color: Color,
    #[bind(request = "balance,optional")]
    pub balance: NullMoney,
}

// ============================================================================
// Outcomes
// ============================================================================

#[test]
fn test_exact_params_bind_successfully() {
    let mut pet = Pet::default();
    bind(
        &params(json!({"name": "Rex", "age": 4, "weight": 12.5, "vaccinated": true})),
        &mut pet,
    )
    .unwrap();
    assert_eq!(pet.name, "Rex");
    assert_eq!(pet.age, 4);
    assert_eq!(pet.weight, 12.5);
    assert!(pet.vaccinated);
}

#[test]
fn test_missing_required_field_is_soft() {
    let mut pet = Pet::default();
    let err = bind(
        &params(json!({"name": "Rex", "weight": 1, "vaccinated": false})),
        &mut pet,
    )
    .unwrap_err();
    let missing = err.missing_fields().expect("expected MissingFields");
    assert_eq!(missing.names(), ["age".to_string()]);
    assert_eq!(pet.name, "Rex");

    // partial updates can ignore it
    let mut pet = Pet::default();
    bind(&params(json!({"name": "Rex"})), &mut pet)
        .allow_missing()
        .unwrap();
    assert_eq!(pet.name, "Rex");
}

#[test]
fn test_unmatched_parameter_is_hard_error() {
    let mut pet = Pet::default();
    let err = bind(
        &params(json!({
            "name": "Rex", "age": 4, "weight": 1, "vaccinated": true, "color": "red"
        })),
        &mut pet,
    )
    .unwrap_err();
    match err {
        BindError::UnmatchedParameters {
            params,
            matched,
            unmatched,
        } => {
            assert_eq!(params, 5);
            assert_eq!(matched, 4);
            assert_eq!(unmatched, vec!["color".to_string()]);
        }
        other => panic!("expected UnmatchedParameters, got {other:?}"),
    }
    // extra params win over missing fields
    let err = bind(&params(json!({"color": "red"})), &mut Pet::default()).unwrap_err();
    assert!(matches!(err, BindError::UnmatchedParameters { .. }));
}

// ============================================================================
// Key resolution
// ============================================================================

#[test]
fn test_tag_precedence() {
    let mut t = Tagged::default();
    bind(
        &params(json!({"user_name": "ann", "mail": "a@x", "zip_code": "0101"})),
        &mut t,
    )
    .unwrap();
    assert_eq!(t.name, "ann");
    assert_eq!(t.email, "a@x");
    assert_eq!(t.zip, "0101");
}

#[test]
fn test_skipped_and_private_fields_never_counted() {
    // absent: not missing
    let mut t = Tagged::default();
    bind(
        &params(json!({"user_name": "a", "mail": "b", "zip_code": "c"})),
        &mut t,
    )
    .unwrap();

    // present: unmatched, never bound
    for key in ["internal", "also_internal", "-", "secret"] {
        let mut t = Tagged::default();
        let mut p = params(json!({"user_name": "a", "mail": "b", "zip_code": "c"}));
        p.insert(key.to_string(), json!(1));
        let err = bind(&p, &mut t).unwrap_err();
        assert!(matches!(err, BindError::UnmatchedParameters { .. }), "{key}");
        assert_eq!(t.internal, 0);
        assert_eq!(t.also_internal, 0);
        assert!(t.secret.is_empty());
    }
}

#[test]
fn test_untagged_key_is_lowercased_name() {
    let mut legacy = Legacy::default();
    bind(
        &params(json!({"username": "ann", "region": "eu"})),
        &mut legacy,
    )
    .unwrap();
    assert_eq!(legacy.UserName, "ann");
    assert_eq!(legacy.Region, "eu");
}

#[test]
fn test_option_precedence_over_default() {
    // required by default: "optional" wins
    let binder = Binder::new(BindConfig::default());
    let mut o = Options::default();
    binder
        .bind(&params(json!({"nick": "n"})), &mut o)
        .unwrap();
    assert!(o.name.is_empty());

    // optional by default: "required" wins
    let binder = Binder::new(BindConfig::default().with_required_by_default(false));
    let err = binder
        .bind(&params(json!({"name": "x"})), &mut Options::default())
        .unwrap_err();
    assert_eq!(err.missing_fields().unwrap().names(), ["nick".to_string()]);

    // optional by default: untagged fields may be absent
    binder
        .bind(&ParamMap::new(), &mut Pet::default())
        .unwrap();
}

// ============================================================================
// Embedding
// ============================================================================

#[test]
fn test_embedded_fields_share_namespace() {
    let mut doc = Document::default();
    bind(
        &params(json!({"title": "t", "created_by": "ann", "revision": "3"})),
        &mut doc,
    )
    .unwrap();
    assert_eq!(doc.title, "t");
    assert_eq!(doc.audit.created_by, "ann");
    assert_eq!(doc.audit.revision, 3);
}

#[test]
fn test_embedded_missing_and_errors() {
    let err = bind(&params(json!({"title": "t"})), &mut Document::default()).unwrap_err();
    assert_eq!(
        err.missing_fields().unwrap().names(),
        ["created_by".to_string(), "revision".to_string()]
    );

    let mut doc = Document::default();
    let err = bind(
        &params(json!({"title": "t", "created_by": "a", "revision": "x"})),
        &mut doc,
    )
    .unwrap_err();
    assert_eq!(err.key(), Some("revision"));
    assert_eq!(doc.title, "t");
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn test_numeric_coercion() {
    let mut pet = Pet::default();
    bind(
        &params(json!({"name": "a", "age": "17", "weight": "2.25", "vaccinated": false})),
        &mut pet,
    )
    .unwrap();
    assert_eq!(pet.age, 17);
    assert_eq!(pet.weight, 2.25);

    let err = bind(
        &params(json!({"name": "a", "age": "abc", "weight": 1, "vaccinated": false})),
        &mut Pet::default(),
    )
    .unwrap_err();
    match err {
        BindError::Conversion { key, source } => {
            assert_eq!(key, "age");
            assert!(matches!(source, ConversionError::InvalidInteger { .. }));
        }
        other => panic!("expected Conversion, got {other:?}"),
    }
}

#[test]
fn test_null_into_plain_field_is_error() {
    let err = bind(
        &params(json!({"name": null, "age": 1, "weight": 1, "vaccinated": true})),
        &mut Pet::default(),
    )
    .unwrap_err();
    match err {
        BindError::Conversion { key, source } => {
            assert_eq!(key, "name");
            assert!(matches!(source, ConversionError::NullNotAllowed { .. }));
        }
        other => panic!("expected Conversion, got {other:?}"),
    }
}

#[test]
fn test_nullable_wrappers() {
    let mut n = Nullables {
        count: NullInt64::new(5),
        ..Default::default()
    };
    bind(&params(json!({"count": null, "label": null, "note": null})), &mut n).unwrap();
    assert!(!n.count.valid);
    assert_eq!(n.count.int64, 0);
    assert!(!n.label.valid);
    assert_eq!(n.note, None);

    let mut n = Nullables::default();
    bind(&params(json!({"count": 42, "label": "x", "note": "hi"})), &mut n).unwrap();
    assert!(n.count.valid);
    assert_eq!(n.count.int64, 42);
    assert_eq!(n.label.get().map(String::as_str), Some("x"));
    assert_eq!(n.note.as_deref(), Some("hi"));
}

#[test]
fn test_nullable_rule_can_be_removed() {
    let binder = Binder::default().without_rules();
    let err = binder
        .bind(&params(json!({"count": 1})), &mut Nullables::default())
        .unwrap_err();
    match err {
        BindError::Conversion { source, .. } => {
            assert!(matches!(source, ConversionError::Unsupported { type_name: "NullInt64" }));
        }
        other => panic!("expected Conversion, got {other:?}"),
    }
}

// ============================================================================
// Capabilities
// ============================================================================

#[test]
fn test_receiver_replaces_builtin_conversion() {
    let mut account = Account::default();
    bind(&params(json!({"factor": 21})), &mut account).unwrap();
    assert_eq!(account.factor.value, 42);

    let mut account = Account::default();
    bind(&params(json!({"factor": null})), &mut account).unwrap();
    assert!(account.factor.saw_null);
}

#[test]
fn test_receiver_error_is_verbatim() {
    let mut account = Account::default();
    let err = bind(&params(json!({"password": "short"})), &mut account).unwrap_err();
    assert_eq!(err.to_string(), "password too short");
    assert_eq!(err.key(), Some("password"));
    assert!(matches!(err, BindError::Hook { .. }));

    bind(&params(json!({"password": "long enough"})), &mut account).unwrap();
    assert_eq!(account.password.0, "hashed:11");
}

#[test]
fn test_pre_and_post_receive_hooks() {
    let mut account = Account::default();
    bind(&params(json!({"bio": "hello"})), &mut account).unwrap();
    assert_eq!(account.bio.text, "hello");
    assert_eq!(account.bio.pre, 1);
    assert_eq!(account.bio.post, 1);

    // hooks do not run for absent fields
    let mut account = Account::default();
    bind(&ParamMap::new(), &mut account).unwrap();
    assert_eq!(account.bio.pre, 0);
    assert_eq!(account.bio.post, 0);

    let err = bind(&params(json!({"bio": ""})), &mut Account::default()).unwrap_err();
    assert_eq!(err.to_string(), "text must not be empty");

    let err = bind(&params(json!({"bio": 3})), &mut Account::default()).unwrap_err();
    assert!(matches!(err, BindError::Conversion { .. }));
}

#[test]
fn test_default_value_provider() {
    let mut account = Account::default();
    bind(&ParamMap::new(), &mut account).unwrap();
    assert_eq!(account.color.0, "blue");

    let mut account = Account::default();
    bind(&params(json!({"color": "red"})), &mut account).unwrap();
    assert_eq!(account.color.0, "red");
}

#[test]
fn test_failing_pre_receive_aborts_field() {
    let mut vault = Vault::default();
    let err = bind(&params(json!({"gate": 5, "contents": "gold"})), &mut vault).unwrap_err();
    assert!(matches!(err, BindError::Hook { .. }));
    assert_eq!(err.to_string(), "locked");
    assert_eq!(err.key(), Some("gate"));
    assert_eq!(vault.gate.pre, 1);
    assert_eq!(vault.gate.value, 0);
    // the walk stops at the failing field
    assert!(vault.contents.is_empty());
}

#[test]
fn test_default_value_only_for_absent_optional_fields() {
    let mut limits = Limits::default();
    let err = bind(&ParamMap::new(), &mut limits).unwrap_err();
    assert_eq!(err.missing_fields().unwrap().names(), ["hard".to_string()]);
    assert_eq!(limits.hard.value, 0);
    assert_eq!(limits.hard.calls.get(), 0);
    assert_eq!(limits.soft.value, 7);
    assert_eq!(limits.soft.calls.get(), 1);

    let mut limits = Limits::default();
    bind(&params(json!({"soft": 3, "hard": "4"})), &mut limits).unwrap();
    assert_eq!(limits.soft.value, 3);
    assert_eq!(limits.soft.calls.get(), 0);
    assert_eq!(limits.hard.value, 4);
    assert_eq!(limits.hard.calls.get(), 0);
}

#[test]
fn test_custom_nullable_type() {
    let mut account = Account::default();
    bind(&params(json!({"balance": "1250"})), &mut account).unwrap();
    assert!(account.balance.valid);
    assert_eq!(account.balance.cents, 1250);

    bind(&params(json!({"balance": null})), &mut account).unwrap();
    assert!(!account.balance.valid);
    assert_eq!(account.balance.cents, 0);
}

#[test]
fn test_binder_is_shareable_across_threads() {
    let binder = std::sync::Arc::new(Binder::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let binder = std::sync::Arc::clone(&binder);
            std::thread::spawn(move || {
                let mut pet = Pet::default();
                binder
                    .bind(
                        &params(json!({"name": "p", "age": i, "weight": 1, "vaccinated": true})),
                        &mut pet,
                    )
                    .map(|()| pet.age)
            })
        })
        .collect();
    let mut ages: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    ages.sort_unstable();
    assert_eq!(ages, vec![0, 1, 2, 3]);
}
