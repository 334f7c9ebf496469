//! Derive macros for brrtbind
//!
//! - `#[derive(Model)]` builds the field descriptor table a record needs so
//!   the binder can walk it: resolved tags, visibility and embedding.
//! - `#[derive(Bindable)]` wires the optional capability queries (receiver,
//!   pre/post receive hooks, default values, nullable parts) for a field type.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Result as SynResult,
    Visibility,
};

#[derive(Default)]
struct FieldAttrs {
    request: Option<String>,
    response: Option<String>,
    db: Option<String>,
    embed: bool,
    skip: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> SynResult<Self> {
        let mut out = FieldAttrs::default();
        for attr in attrs {
            if !attr.path().is_ident("bind") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("request") {
                    let s: LitStr = meta.value()?.parse()?;
                    out.request = Some(s.value());
                } else if meta.path.is_ident("response") {
                    let s: LitStr = meta.value()?.parse()?;
                    out.response = Some(s.value());
                } else if meta.path.is_ident("db") {
                    let s: LitStr = meta.value()?.parse()?;
                    out.db = Some(s.value());
                } else if meta.path.is_ident("embed") {
                    out.embed = true;
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                } else {
                    return Err(meta.error(
                        "unsupported #[bind] key, expected one of: request, response, db, embed, skip",
                    ));
                }
                Ok(())
            })?;
        }
        if out.skip {
            if out.request.is_some() {
                return Err(syn::Error::new(
                    proc_macro2::Span::call_site(),
                    "#[bind(skip)] cannot be combined with #[bind(request = ...)]",
                ));
            }
            out.request = Some("-".to_string());
        }
        Ok(out)
    }
}

fn opt_str(value: &Option<String>) -> TokenStream2 {
    match value {
        Some(s) => quote! { ::core::option::Option::Some(#s) },
        None => quote! { ::core::option::Option::None },
    }
}

fn field_name(ident: &Ident) -> String {
    let raw = ident.to_string();
    raw.strip_prefix("r#").map(str::to_string).unwrap_or(raw)
}

/// Derive `brrtbind::Model` for a struct with named fields.
///
/// Field attributes:
///
/// ```ignore
/// #[derive(Default, Model)]
/// pub struct Signup {
///     #[bind(request = "user,optional")]
///     pub username: String,
///     #[bind(response = "mail")]
///     pub email: String,
///     #[bind(skip)]
///     pub internal_id: i64,
///     #[bind(embed)]
///     pub audit: Audit,
///     secret: String, // not pub: never bound
/// }
/// ```
#[proc_macro_derive(Model, attributes(bind))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_model(&input) {
        Ok(ts) => ts.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_model(input: &DeriveInput) -> SynResult<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "#[derive(Model)] requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "#[derive(Model)] can only be used on structs",
            ))
        }
    };

    let mut metas = Vec::with_capacity(fields.len());
    let mut slots = Vec::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let attrs = FieldAttrs::parse(&field.attrs)?;
        let exported = matches!(field.vis, Visibility::Public(_));
        let embedded = attrs.embed;
        let rust_name = field_name(ident);
        let request = opt_str(&attrs.request);
        let response = opt_str(&attrs.response);
        let db = opt_str(&attrs.db);

        metas.push(quote! {
            ::brrtbind::FieldMeta {
                name: #rust_name,
                tags: ::brrtbind::Tags {
                    request: #request,
                    response: #response,
                    db: #db,
                },
                exported: #exported,
                embedded: #embedded,
            }
        });

        // Embedded records are walked even when not pub, like anonymous fields.
        let slot = if embedded {
            quote! { ::brrtbind::FieldSlot::Embedded(&mut self.#ident) }
        } else if exported {
            quote! { ::brrtbind::FieldSlot::Value(&mut self.#ident) }
        } else {
            quote! { ::brrtbind::FieldSlot::Hidden }
        };
        slots.push(quote! { ::brrtbind::Field::new(&FIELDS[#index], #slot) });
    }

    let count = metas.len();
    let body = if count == 0 {
        quote! { ::std::vec::Vec::new() }
    } else {
        quote! {
            static FIELDS: [::brrtbind::FieldMeta; #count] = [#(#metas),*];
            ::std::vec![#(#slots),*]
        }
    };

    Ok(quote! {
        impl #impl_generics ::brrtbind::Model for #name #ty_generics #where_clause {
            fn fields(&mut self) -> ::std::vec::Vec<::brrtbind::Field<'_>> {
                #body
            }
        }
    })
}

#[derive(Default)]
struct BindableAttrs {
    receiver: bool,
    pre_receive: bool,
    post_receive: bool,
    default_value: bool,
    serde: bool,
    nullable: Option<(Ident, Ident)>,
}

impl BindableAttrs {
    fn parse(attrs: &[Attribute]) -> SynResult<Self> {
        let mut out = BindableAttrs::default();
        for attr in attrs {
            if !attr.path().is_ident("bindable") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("receiver") {
                    out.receiver = true;
                } else if meta.path.is_ident("pre_receive") {
                    out.pre_receive = true;
                } else if meta.path.is_ident("post_receive") {
                    out.post_receive = true;
                } else if meta.path.is_ident("default_value") {
                    out.default_value = true;
                } else if meta.path.is_ident("serde") {
                    out.serde = true;
                } else if meta.path.is_ident("nullable") {
                    let mut value = None;
                    let mut valid = None;
                    meta.parse_nested_meta(|inner| {
                        let s: LitStr = inner.value()?.parse()?;
                        let ident = Ident::new(&s.value(), s.span());
                        if inner.path.is_ident("value") {
                            value = Some(ident);
                        } else if inner.path.is_ident("valid") {
                            valid = Some(ident);
                        } else {
                            return Err(inner.error("expected `value` or `valid`"));
                        }
                        Ok(())
                    })?;
                    let value = value
                        .ok_or_else(|| meta.error("nullable(...) requires `value = \"field\"`"))?;
                    let valid = valid
                        .unwrap_or_else(|| Ident::new("valid", proc_macro2::Span::call_site()));
                    out.nullable = Some((valid, value));
                } else {
                    return Err(meta.error(
                        "unsupported #[bindable] key, expected one of: receiver, pre_receive, \
                         post_receive, default_value, serde, nullable",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

/// Derive `brrtbind::Bindable` for a field type and declare which
/// capabilities it implements.
///
/// ```ignore
/// #[derive(Default, Bindable)]
/// #[bindable(receiver, default_value)]
/// pub struct Password(String);
///
/// impl Receiver for Password { /* ... */ }
/// impl DefaultValueProvider for Password { /* ... */ }
/// ```
#[proc_macro_derive(Bindable, attributes(bindable))]
pub fn derive_bindable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_bindable(&input) {
        Ok(ts) => ts.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_bindable(input: &DeriveInput) -> SynResult<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let attrs = BindableAttrs::parse(&input.attrs)?;

    // The nullable conversion rule only picks up `Null<Scalar>` type names.
    if attrs.nullable.is_some() {
        let type_name = name.to_string();
        let scalar = type_name.strip_prefix("Null").unwrap_or_default();
        if scalar.is_empty() {
            return Err(syn::Error::new_spanned(
                name,
                "nullable wrappers must be named Null<Scalar>",
            ));
        }
    }

    let assign = if attrs.serde {
        quote! { ::brrtbind::convert::deserialize_into(self, raw) }
    } else {
        quote! {
            ::core::result::Result::Err(::brrtbind::ConversionError::Unsupported {
                type_name: ::brrtbind::Bindable::type_name(self),
            })
        }
    };

    let mut extra = Vec::new();
    if attrs.receiver {
        extra.push(quote! {
            fn as_receiver(&mut self) -> ::core::option::Option<&mut dyn ::brrtbind::Receiver> {
                ::core::option::Option::Some(self)
            }
        });
    }
    if attrs.pre_receive {
        extra.push(quote! {
            fn as_pre_receive(&mut self) -> ::core::option::Option<&mut dyn ::brrtbind::PreReceive> {
                ::core::option::Option::Some(self)
            }
        });
    }
    if attrs.post_receive {
        extra.push(quote! {
            fn as_post_receive(&mut self) -> ::core::option::Option<&mut dyn ::brrtbind::PostReceive> {
                ::core::option::Option::Some(self)
            }
        });
    }
    if attrs.default_value {
        extra.push(quote! {
            fn as_default_provider(&self) -> ::core::option::Option<&dyn ::brrtbind::DefaultValueProvider> {
                ::core::option::Option::Some(self)
            }
        });
    }
    if let Some((valid, value)) = &attrs.nullable {
        extra.push(quote! {
            fn accepts_null(&self) -> bool {
                true
            }

            fn as_nullable(&mut self) -> ::core::option::Option<::brrtbind::NullableParts<'_>> {
                ::core::option::Option::Some(::brrtbind::NullableParts {
                    valid: &mut self.#valid,
                    value: &mut self.#value,
                })
            }
        });
    }

    Ok(quote! {
        impl #impl_generics ::brrtbind::Bindable for #name #ty_generics #where_clause {
            fn assign(
                &mut self,
                raw: &::brrtbind::Value,
            ) -> ::core::result::Result<(), ::brrtbind::ConversionError> {
                #assign
            }

            #(#extra)*
        }
    })
}
