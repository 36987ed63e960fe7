use crate::attributes::{ComponentAttributes, DefaultDefinition, FieldAttributes};
use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::quote;
use std::ops::Deref;
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DataStruct, DeriveInput, Error, Field, Fields, GenericArgument, Item,
    PathArguments, Result, Type,
};

const COMPONENT: &str = "component";
const POINTER_TYPES: [&str; 2] = ["ComponentInstancePtr", "Arc"];
const OPTION_TYPES: [&str; 1] = ["Option"];

struct Parameter {
    declaration: TokenStream,
    argument: TokenStream,
}

// Wrapper<T> -> T, matching the last path segment only
fn single_generic_argument<'t>(ty: &'t Type, wrappers: &[&str]) -> Option<&'t Type> {
    let Type::Path(path) = ty else {
        return None;
    };

    if path.qself.is_some() {
        return None;
    }

    let segment = path.path.segments.last()?;
    if !wrappers.iter().any(|wrapper| segment.ident == *wrapper) {
        return None;
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };

    match arguments.args.iter().exactly_one() {
        Ok(GenericArgument::Type(ty)) => Some(ty),
        _ => None,
    }
}

fn extract_attributes<'a, T: TryFrom<&'a Attribute, Error = Error>>(
    attributes: &'a [Attribute],
) -> Result<Option<T>> {
    attributes
        .iter()
        .filter(|attribute| attribute.path().is_ident(COMPONENT))
        .map(T::try_from)
        .next()
        .transpose()
}

fn generate_parameter(field: &Field) -> Result<Parameter> {
    let ty = &field.ty;

    if let Some(FieldAttributes {
        default: Some(default),
    }) = extract_attributes::<FieldAttributes>(&field.attrs)?
    {
        let declaration = match default {
            DefaultDefinition::Default => quote!(.with_default_value::<#ty>()),
            DefaultDefinition::Expr(path) => quote!(.with_value_or_else::<#ty>(#path)),
        };

        return Ok(Parameter {
            declaration,
            argument: quote!(arguments.value()?),
        });
    }

    if let Some(service) = single_generic_argument(ty, &POINTER_TYPES) {
        return Ok(Parameter {
            declaration: quote!(.with_service::<#service>()),
            argument: quote!(arguments.service()?),
        });
    }

    if let Some(service) = single_generic_argument(ty, &OPTION_TYPES)
        .and_then(|inner| single_generic_argument(inner, &POINTER_TYPES))
    {
        return Ok(Parameter {
            declaration: quote!(.with_optional_service::<#service>()),
            argument: quote!(arguments.optional_service()?),
        });
    }

    Ok(Parameter {
        declaration: quote!(.with_value::<#ty>()),
        argument: quote!(arguments.value()?),
    })
}

fn generate_constructor(fields: &Fields) -> Result<TokenStream> {
    let parameters = fields
        .iter()
        .map(generate_parameter)
        .collect::<Result<Vec<_>>>()?;
    let declarations = parameters.iter().map(|parameter| &parameter.declaration);
    let arguments = parameters.iter().map(|parameter| &parameter.argument);

    let generation = match fields {
        Fields::Named(fields) => {
            let idents = fields.named.iter().map(|field| field.ident.as_ref());
            quote! {
                Self {
                    #(#idents: #arguments),*
                }
            }
        }
        Fields::Unnamed(_) => quote! {
            Self(#(#arguments),*)
        },
        Fields::Unit => quote! { Self },
    };

    let arguments_ident = if fields.is_empty() {
        quote!(_)
    } else {
        quote!(arguments)
    };

    Ok(quote! {
        vec![
            autowire_di::constructor::Constructor::new(|#arguments_ident| Ok(#generation))
                #(#declarations)*
        ]
    })
}

pub fn expand_component(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(DataStruct { fields, .. }) = &input.data else {
        return Err(Error::new(
            input.span(),
            "Can only derive Component on structs!",
        ));
    };

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Generic components are not supported!",
        ));
    }

    let ident = &input.ident;
    let constructors = match extract_attributes::<ComponentAttributes>(&input.attrs)? {
        Some(ComponentAttributes {
            constructors: Some(path),
        }) => quote!(#path()),
        _ => generate_constructor(fields)?,
    };

    Ok(quote! {
        #[automatically_derived]
        impl autowire_di::component::Injectable for #ident {}

        #[automatically_derived]
        impl autowire_di::component::ComponentDowncast<#ident> for #ident {
            fn downcast(
                source: autowire_di::instance_provider::ComponentInstanceAnyPtr,
            ) -> Result<autowire_di::instance_provider::ComponentInstancePtr<Self>, autowire_di::instance_provider::ComponentInstanceAnyPtr> {
                source.downcast()
            }
        }

        #[automatically_derived]
        impl autowire_di::component::Component for #ident {
            fn constructors() -> Vec<autowire_di::constructor::Constructor<Self>> {
                #constructors
            }
        }
    })
}

pub fn implement_injectable(item: &Item) -> Result<TokenStream> {
    let Item::Trait(item_trait) = item else {
        return Err(Error::new(
            item.span(),
            "Only traits can be marked as injectable!",
        ));
    };

    if !item_trait.generics.params.is_empty() {
        return Err(Error::new(
            item_trait.generics.span(),
            "Generic traits cannot be injectable!",
        ));
    }

    let ident = &item_trait.ident;

    Ok(quote! {
        #item_trait

        #[automatically_derived]
        impl autowire_di::component::Injectable for dyn #ident + Send + Sync {}
    })
}

pub fn implement_component_alias(item: &Item) -> Result<TokenStream> {
    let Item::Impl(item_impl) = item else {
        return Err(Error::new(
            item.span(),
            "Registering traits for components is possible only on trait implementations!",
        ));
    };

    let trait_type = item_impl
        .trait_
        .as_ref()
        .map(|(_, path, ..)| path)
        .ok_or_else(|| Error::new(item.span(), "Missing trait identifier!"))?;

    let target_type = if let Type::Path(path) = item_impl.self_ty.deref() {
        &path.path
    } else {
        return Err(Error::new(
            item.span(),
            "Registering traits is only available for Components!",
        ));
    };

    Ok(quote! {
        #item_impl

        #[automatically_derived]
        impl autowire_di::component::ComponentDowncast<#target_type> for dyn #trait_type + Send + Sync {
            fn downcast(
                source: autowire_di::instance_provider::ComponentInstanceAnyPtr,
            ) -> Result<autowire_di::instance_provider::ComponentInstancePtr<Self>, autowire_di::instance_provider::ComponentInstanceAnyPtr> {
                source
                    .downcast::<#target_type>()
                    .map(|p| p as autowire_di::instance_provider::ComponentInstancePtr<Self>)
            }
        }
    })
}
