use std::collections::{BTreeMap, HashSet};

use proc_macro::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, GenericArgument, Ident, LitInt, Pat,
    PathArguments, Result, Token, Type,
    parse::{Parse, ParseStream},
    parse_quote,
    spanned::Spanned,
};

pub(crate) fn expand_from_subset(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`FromSubset` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`FromSubset` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    type Case = (Ident, Option<(Type, ExprClosure)>);
    let mut methods: BTreeMap<Primitive, Vec<(u16, Case)>> = BTreeMap::new();
    let mut seen = HashSet::new();

    for field in fields {
        if !seen.insert(field.code) {
            Err(Error::new_spanned(
                &field.descriptor,
                "Descriptors must be unique.",
            ))?
        }

        methods
            .entry(field.primitive)
            .or_default()
            .push((field.code, (field.name, field.handler)));
    }

    let methods = methods.into_iter().map(|(primitive, fields)| {
        let cases = fields.into_iter().map(|(code, (name, handler))| {
            let assignment = if let Some((field_type, handler)) = handler {
                let body = handler.body;
                let acc = &handler.inputs[0];
                let val = &handler.inputs[1];

                quote! {
                    (|#acc: &mut #field_type, #val| {#body})(&mut self.#name, value)
                }
            } else {
                quote! {
                    self.#name = Some(value.into())
                }
            };

            let code = LitInt::new(&code.to_string(), name.span());

            quote! { #code => { #assignment } }
        });

        let method = format_ident!("add_{}", primitive.name());
        let value_type = primitive.value_type();

        quote! {
            fn #method(&mut self, code: ::crex::Varcode, value: #value_type) {
                match code.raw() {
                    #(#cases)*
                    _ => {}
                };
            }
        }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl ::crex::avec::FromSubset for #name {
            #(#methods)*
        }
    };

    Ok(expanded.into())
}

/// The value types published by `FromSubset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Primitive {
    Integer,
    Decimal,
    String,
    Binary,
}

impl Primitive {
    fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Binary => "binary",
        }
    }

    fn value_type(self) -> Type {
        match self {
            Self::Integer => parse_quote! { i64 },
            Self::Decimal => parse_quote! { f64 },
            Self::String => parse_quote! { &str },
            Self::Binary => parse_quote! { &[u8] },
        }
    }

    /// The primitive received by a handler closure parameter of type `ty`.
    fn from_parameter(ty: &Type) -> Option<Self> {
        match normalize(ty).as_str() {
            "i64" => Some(Self::Integer),
            "f64" => Some(Self::Decimal),
            "&str" => Some(Self::String),
            "&[u8]" => Some(Self::Binary),
            _ => None,
        }
    }

    /// The primitive stored in a field of type `Option<ty>`.
    fn from_field(ty: &Type) -> Option<Self> {
        match normalize(ty).as_str() {
            "i64" => Some(Self::Integer),
            "f64" => Some(Self::Decimal),
            "String" => Some(Self::String),
            "Vec<u8>" => Some(Self::Binary),
            _ => None,
        }
    }
}

fn normalize(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    primitive: Primitive,
    code: u16,
    descriptor: Ident,
    handler: Option<(Type, ExprClosure)>,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("var")) else {
            return Ok(None);
        };

        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let VarAttribute { descriptor, handler } = attr.meta.require_list()?.parse_args()?;

        let code = parse_descriptor(&descriptor)?;

        let primitive = if let Some(handler) = &handler {
            let Some(parameter) = handler.inputs.iter().nth(1) else {
                Err(Error::new_spanned(
                    handler,
                    "Handler closure must have two parameters.",
                ))?
            };

            let Pat::Type(pat_type) = parameter else {
                Err(Error::new_spanned(
                    parameter,
                    "Handler closure's second parameter must be annotated with one of `i64`, `f64`, `&str` or `&[u8]`.",
                ))?
            };

            Primitive::from_parameter(&pat_type.ty).ok_or_else(|| {
                Error::new_spanned(
                    &pat_type.ty,
                    "Handler closure's second parameter must be one of `i64`, `f64`, `&str` or `&[u8]`.",
                )
            })?
        } else {
            let Type::Path(path) = &field.ty else {
                Err(Error::new_spanned(
                    &field.ty,
                    "Field must have a type annotation.",
                ))?
            };

            let Some(segment) = path.path.segments.last() else {
                Err(Error::new_spanned(
                    &path.path.segments,
                    "Field must have a type annotation.",
                ))?
            };

            if segment.ident != "Option" {
                Err(Error::new_spanned(
                    &segment.ident,
                    "Field without a handler must have type `Option<T>`.",
                ))?
            }

            let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
                Err(Error::new_spanned(
                    &segment.arguments,
                    "Field of type `Option<T>` must have a generic parameter.",
                ))?
            };

            let Some(GenericArgument::Type(inner_type)) = arguments.args.first() else {
                Err(Error::new_spanned(
                    &arguments.args,
                    "Generic argument of a field of type `Option<T>` must be a type.",
                ))?
            };

            Primitive::from_field(inner_type).ok_or_else(|| {
                Error::new_spanned(
                    inner_type,
                    "Field must have type `Option<T>`, where `T` is one of `i64`, `f64`, `String` or `Vec<u8>`.",
                )
            })?
        };

        let handler = handler.map(|h| (field.ty.clone(), h));

        Ok(Some(Self {
            name,
            primitive,
            code,
            descriptor,
            handler,
        }))
    }
}

/// Parse an element descriptor such as `B12101` into its packed form.
fn parse_descriptor(ident: &Ident) -> Result<u16> {
    let invalid = || {
        Error::new_spanned(
            ident,
            "Descriptor must be an element code, `B` followed by five digits.",
        )
    };

    let text = ident.to_string();

    let Some(digits) = text.strip_prefix('B') else {
        Err(invalid())?
    };

    if digits.len() != 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        Err(invalid())?
    }

    let x: u16 = digits[..2].parse().map_err(|_| invalid())?;
    let y: u16 = digits[2..].parse().map_err(|_| invalid())?;

    if x > 63 || y > 255 {
        Err(invalid())?
    }

    Ok((x << 8) | y)
}

#[derive(Debug)]
struct VarAttribute {
    descriptor: Ident,
    handler: Option<ExprClosure>,
}

impl Parse for VarAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let descriptor = input.parse::<Ident>()?;

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self {
            descriptor,
            handler,
        })
    }
}
