//! Derive macro for structured model outputs.
//!
//! `#[derive(Tool)]` turns a struct with named fields into a tool definition
//! whose input schema mirrors the struct. Forcing the model to call that tool
//! is how the narrative layer gets a single well-formed field back.
//!
//! ```ignore
//! /// Generate the boss's retort to an attack
//! #[derive(Tool, Deserialize)]
//! #[tool(name = "generate_boss_response")]
//! struct BattleRetort {
//!     /// The boss's reply
//!     response: String,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, DeriveInput, Expr, Field, Lit, LitStr, Meta, Type};

/// Derive a tool definition from a struct.
///
/// - `#[tool(name = "...")]` on the struct overrides the tool name (default: snake_case struct name)
/// - `#[tool(rename = "...")]` on a field overrides its schema name
/// - `#[tool(optional)]` on a field drops it from `required`; `Option<T>` fields are never required
#[proc_macro_derive(Tool, attributes(tool))]
pub fn derive_tool(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

struct FieldSpec {
    name: String,
    description: String,
    schema: TokenStream2,
    required: bool,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let tool_name = struct_tool_name(&input)?;
    let description = doc_text(&input.attrs);

    let named = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "Tool can only be derived for structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(ident, "Tool can only be derived for structs")),
    };

    let fields = named.iter().map(field_spec).collect::<syn::Result<Vec<_>>>()?;

    let properties = fields.iter().map(|f| {
        let name = &f.name;
        let schema = &f.schema;
        let describe = (!f.description.is_empty()).then(|| {
            let text = &f.description;
            quote! { property["description"] = serde_json::Value::from(#text); }
        });
        quote! {
            {
                let mut property = #schema;
                #describe
                properties.insert(#name.to_string(), property);
            }
        }
    });
    let required = fields.iter().filter(|f| f.required).map(|f| f.name.as_str());

    Ok(quote! {
        impl #ident {
            pub fn tool_name() -> &'static str {
                #tool_name
            }

            pub fn tool_description() -> &'static str {
                #description
            }

            pub fn input_schema() -> serde_json::Value {
                let mut properties = serde_json::Map::new();
                #(#properties)*
                serde_json::json!({
                    "type": "object",
                    "properties": properties,
                    "required": [#(#required),*]
                })
            }

            pub fn as_tool() -> claude::Tool {
                claude::Tool {
                    name: Self::tool_name().to_string(),
                    description: Self::tool_description().to_string(),
                    input_schema: Self::input_schema(),
                }
            }
        }
    })
}

fn struct_tool_name(input: &DeriveInput) -> syn::Result<String> {
    let mut name = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("tool")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported tool attribute; expected `name`"))
            }
        })?;
    }
    Ok(name.unwrap_or_else(|| snake_case(&input.ident.to_string())))
}

fn field_spec(field: &Field) -> syn::Result<FieldSpec> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;

    let mut name = ident.to_string();
    let mut optional = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("tool")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                name = value.value();
                Ok(())
            } else if meta.path.is_ident("optional") {
                optional = true;
                Ok(())
            } else {
                Err(meta.error("unsupported tool attribute; expected `rename` or `optional`"))
            }
        })?;
    }

    Ok(FieldSpec {
        name,
        description: doc_text(&field.attrs),
        schema: json_schema(&field.ty),
        required: !optional && generic_inner(&field.ty, "Option").is_none(),
    })
}

fn doc_text(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| match &a.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The type argument of `wrapper<T>`, if `ty` is that wrapper.
fn generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn json_schema(ty: &Type) -> TokenStream2 {
    if let Some(inner) = generic_inner(ty, "Option") {
        return json_schema(inner);
    }
    if let Some(inner) = generic_inner(ty, "Vec") {
        let items = json_schema(inner);
        return quote! { serde_json::json!({ "type": "array", "items": #items }) };
    }

    let Type::Path(path) = ty else {
        return quote! { serde_json::json!({}) };
    };
    let kind = match path.path.segments.last().map(|s| s.ident.to_string()).as_deref() {
        Some("String" | "str") => "string",
        Some("i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize") => "integer",
        Some("f32" | "f64") => "number",
        Some("bool") => "boolean",
        _ => "object",
    };
    quote! { serde_json::json!({ "type": #kind }) }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
