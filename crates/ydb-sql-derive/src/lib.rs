//! Derive macro for YDB model schemas.
//!
//! This crate provides `#[derive(Model)]`, which implements
//! `ydb_sql_core::schema::Model` for a struct with named fields.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, LitInt,
    LitStr, Meta, PathArguments, Type,
};

/// Derives the `Model` trait, describing the struct as a YDB table.
///
/// # Attributes
///
/// - `#[model(table = "table_name")]` - Specifies the table name (optional,
///   defaults to snake_case of struct name)
///
/// # Field Attributes
///
/// - `#[field(primary_key)]` - Marks the field as part of the primary key
/// - `#[field(not_null)]` - Marks the column as NOT NULL
/// - `#[field(unique)]` - Marks the column as UNIQUE
/// - `#[field(ignore_migration)]` - Leaves the field out of schema changes
/// - `#[field(name = "column_name")]` - Specifies the column name
/// - `#[field(size = 32)]` - Overrides the bit width of numeric fields
/// - `#[field(default = "expr")]` - Sets a default value expression
/// - `#[field(type = "json")]` - Sets the type tag (`json`, `jsondocument`, `yson`)
/// - `#[field(serializer = "json")]` - Sets the serializer tag
/// - `#[field(index)]` - Adds a single column index `idx_<table>_<column>`
/// - `#[field(index = "name")]` - Adds the column to the named index; fields
///   sharing a name form one composite index in declaration order
///
/// # Field kinds
///
/// The kind is taken from the Rust type. `Option<T>` uses the kind of `T`.
/// Integers and floats carry their bit width, `String` and `&str` map to
/// strings, `Vec<u8>` to bytes, `DateTime`/`NaiveDateTime` to time,
/// `TimeDelta`/`Duration` to durations and `SoftDelete` to the soft-delete
/// marker. Any other type becomes a custom kind named after the type.
#[proc_macro_derive(Model, attributes(model, field))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_model_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_model_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let model_name = struct_name.to_string();
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Model derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Model derive only supports structs",
            ));
        }
    };

    let mut field_entries: Vec<TokenStream2> = Vec::new();
    let mut indexes: Vec<(String, Vec<String>)> = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = ident.to_string();
        let attrs = parse_field_attrs(&field.attrs)?;
        let db_name = attrs.name.clone().unwrap_or_else(|| field_name.clone());
        let (kind, size) = infer_kind(&field.ty);

        for index in &attrs.indexes {
            let name = index
                .clone()
                .unwrap_or_else(|| format!("idx_{table_name}_{db_name}"));
            match indexes.iter_mut().find(|(n, _)| *n == name) {
                Some((_, columns)) => columns.push(field_name.clone()),
                None => indexes.push((name, vec![field_name.clone()])),
            }
        }

        let mut entry = quote! {
            ::ydb_sql_core::schema::Field::new(#field_name, #kind).db_name(#db_name)
        };
        if let Some(size) = attrs.size.or(size) {
            entry.extend(quote! { .size(#size) });
        }
        if attrs.primary_key {
            entry.extend(quote! { .primary_key() });
        }
        if attrs.not_null {
            entry.extend(quote! { .not_null() });
        }
        if attrs.unique {
            entry.extend(quote! { .unique() });
        }
        if attrs.ignore_migration {
            entry.extend(quote! { .ignore_migration() });
        }
        if let Some(tag) = &attrs.type_tag {
            entry.extend(quote! { .type_tag(#tag) });
        }
        if let Some(tag) = &attrs.serializer {
            entry.extend(quote! { .serializer_tag(#tag) });
        }
        if let Some(default) = &attrs.default_value {
            entry.extend(quote! { .default_value(#default) });
        }
        field_entries.push(entry);
    }

    let index_entries = indexes.iter().map(|(name, columns)| {
        quote! {
            ::ydb_sql_core::schema::Index::new(#name, [#(#columns),*])
        }
    });

    let expanded = quote! {
        impl ::ydb_sql_core::schema::Model for #struct_name {
            fn schema() -> ::ydb_sql_core::schema::ModelSchema {
                ::ydb_sql_core::schema::ModelSchema::new(#model_name, #table_name)
                    #(.field(#field_entries))*
                    #(.index(#index_entries))*
            }
        }

        impl #struct_name {
            /// Returns the table name.
            #[inline]
            pub const fn table_name() -> &'static str {
                #table_name
            }
        }
    };

    Ok(expanded)
}

#[derive(Default)]
struct FieldAttrs {
    name: Option<String>,
    primary_key: bool,
    not_null: bool,
    unique: bool,
    ignore_migration: bool,
    size: Option<u32>,
    default_value: Option<String>,
    type_tag: Option<String>,
    serializer: Option<String>,
    /// `None` for an unnamed index.
    indexes: Vec<Option<String>>,
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("model") {
            let mut table_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    let value: LitStr = meta.value()?.parse()?;
                    table_name = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("unknown model attribute"))
                }
            })?;
            if let Some(name) = table_name {
                return Ok(name);
            }
        }
    }
    // Default to snake_case of struct name
    Ok(to_snake_case(&struct_name.to_string()))
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("field") {
            continue;
        }
        // Handle empty attribute like #[field]
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let string_value = || -> syn::Result<String> {
                let value: LitStr = meta.value()?.parse()?;
                Ok(value.value())
            };

            if meta.path.is_ident("primary_key") {
                result.primary_key = true;
            } else if meta.path.is_ident("not_null") {
                result.not_null = true;
            } else if meta.path.is_ident("unique") {
                result.unique = true;
            } else if meta.path.is_ident("ignore_migration") {
                result.ignore_migration = true;
            } else if meta.path.is_ident("name") {
                result.name = Some(string_value()?);
            } else if meta.path.is_ident("default") {
                result.default_value = Some(string_value()?);
            } else if meta.path.is_ident("type") {
                result.type_tag = Some(string_value()?);
            } else if meta.path.is_ident("serializer") {
                result.serializer = Some(string_value()?);
            } else if meta.path.is_ident("size") {
                let value: LitInt = meta.value()?.parse()?;
                result.size = Some(value.base10_parse()?);
            } else if meta.path.is_ident("index") {
                if meta.input.peek(syn::Token![=]) {
                    result.indexes.push(Some(string_value()?));
                } else {
                    result.indexes.push(None);
                }
            } else {
                return Err(meta.error("unknown field attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

/// Maps a Rust type to a `FieldKind` expression and its bit width.
fn infer_kind(ty: &Type) -> (TokenStream2, Option<u32>) {
    let kind = |variant: &str| -> TokenStream2 {
        let variant = Ident::new(variant, proc_macro2::Span::call_site());
        quote! { ::ydb_sql_core::schema::FieldKind::#variant }
    };

    match ty {
        Type::Reference(reference) => return infer_kind(&reference.elem),
        Type::Path(path) => {
            if let Some(segment) = path.path.segments.last() {
                let name = segment.ident.to_string();
                let first_arg = match &segment.arguments {
                    PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
                        GenericArgument::Type(ty) => Some(ty),
                        _ => None,
                    }),
                    _ => None,
                };

                match (name.as_str(), first_arg) {
                    ("Option", Some(inner)) => return infer_kind(inner),
                    ("Vec", Some(inner)) if is_ident(inner, "u8") => return (kind("Bytes"), None),
                    ("bool", _) => return (kind("Bool"), None),
                    ("i8", _) => return (kind("Int"), Some(8)),
                    ("i16", _) => return (kind("Int"), Some(16)),
                    ("i32", _) => return (kind("Int"), Some(32)),
                    ("i64" | "isize", _) => return (kind("Int"), Some(64)),
                    ("u8", _) => return (kind("Uint"), Some(8)),
                    ("u16", _) => return (kind("Uint"), Some(16)),
                    ("u32", _) => return (kind("Uint"), Some(32)),
                    ("u64" | "usize", _) => return (kind("Uint"), Some(64)),
                    ("f32", _) => return (kind("Float"), Some(32)),
                    ("f64", _) => return (kind("Float"), Some(64)),
                    ("String" | "str", _) => return (kind("String"), None),
                    ("DateTime" | "NaiveDateTime", _) => return (kind("Time"), None),
                    ("TimeDelta" | "Duration", _) => return (kind("Duration"), None),
                    ("SoftDelete", _) => return (kind("SoftDelete"), None),
                    _ => {}
                }
            }
        }
        _ => {}
    }

    let name = quote!(#ty).to_string().replace(' ', "");
    (
        quote! { ::ydb_sql_core::schema::FieldKind::Custom(::std::string::String::from(#name)) },
        None,
    )
}

fn is_ident(ty: &Type, ident: &str) -> bool {
    matches!(ty, Type::Path(path) if path.path.is_ident(ident))
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
