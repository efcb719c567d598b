//! Expansion of `#[derive(Reflect)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Data, DeriveInput, Fields, GenericParam, Path};

use crate::parse::{unsupported, ContainerAttrs, FieldAttrs};

/// Expands the derive for `input`.
pub fn expand_reflect(input: TokenStream) -> syn::Result<TokenStream> {
    let mut input: DeriveInput = syn::parse2(input)?;
    let container = ContainerAttrs::from_attrs(&input.attrs)?;
    let krate: Path = container
        .crate_path
        .clone()
        .unwrap_or_else(|| parse_quote!(::waypoint_docs));

    for param in &mut input.generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(#krate::Reflect));
        }
    }

    let shape = match &input.data {
        Data::Struct(data) => struct_shape(&input, &container, &krate, &data.fields)?,
        Data::Enum(data) => {
            if data.variants.iter().any(|variant| !variant.fields.is_empty()) {
                return Err(unsupported(&input.ident, "enums with data"));
            }
            quote!(#krate::Shape::String)
        }
        Data::Union(_) => return Err(unsupported(&input.ident, "unions")),
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::Reflect for #name #ty_generics #where_clause {
            fn shape() -> #krate::Shape {
                #shape
            }
        }
    })
}

fn struct_shape(
    input: &DeriveInput,
    container: &ContainerAttrs,
    krate: &Path,
    fields: &Fields,
) -> syn::Result<TokenStream> {
    let named = match fields {
        Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(unnamed) => {
            // Newtypes serialize as their inner value.
            if unnamed.unnamed.len() == 1 {
                let inner = &unnamed.unnamed[0].ty;
                return Ok(quote!(<#inner as #krate::Reflect>::shape()));
            }
            return Err(unsupported(&input.ident, "tuple structs"));
        }
    };

    let mut entries = Vec::with_capacity(named.len());
    for field in named {
        let Some(ident) = &field.ident else {
            continue;
        };
        let attrs = FieldAttrs::from_attrs(&field.attrs)?;

        let rust_name = ident.to_string();
        let rust_name = rust_name.strip_prefix("r#").unwrap_or(&rust_name).to_string();
        let serialized = attrs.rename.clone().unwrap_or_else(|| {
            container
                .rename_all
                .map_or_else(|| rust_name.clone(), |rule| rule.apply(&rust_name))
        });
        let renamed = serialized != rust_name;

        let ty = &field.ty;
        let mut entry = quote!(#krate::Field::new(#rust_name, <#ty as #krate::Reflect>::shape()));

        let json = attrs
            .json_tag(&serialized)
            .or_else(|| renamed.then(|| serialized.clone()));
        if let Some(json) = json {
            entry.extend(quote!(.json(#json)));
        }

        let xml = attrs
            .xml_tag(&serialized)
            .or_else(|| renamed.then(|| serialized.clone()));
        if let Some(xml) = xml {
            entry.extend(quote!(.xml(#xml)));
        }

        if let Some(description) = &attrs.description {
            entry.extend(quote!(.description(#description)));
        }
        if attrs.flatten {
            entry.extend(quote!(.flatten()));
        }
        entries.push(entry);
    }

    let name = input.ident.to_string();
    let xml_root = container
        .xml_root
        .as_ref()
        .map(|root| quote!(.xml_root(#root)));

    Ok(quote! {
        #krate::Shape::Struct(
            #krate::StructShape::of::<Self>(#name, ::core::module_path!(), || {
                ::std::vec![#(#entries),*]
            })
            #xml_root
        )
    })
}
