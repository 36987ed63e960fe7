use crate::component::{expand_component, implement_component_alias, implement_injectable};
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, Error, Item};

mod attributes;
mod component;

#[proc_macro_derive(Component, attributes(component))]
pub fn generate_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_component(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Marks `dyn Trait + Send + Sync` as injectable, so it can be used as an abstraction in bindings.
#[proc_macro_attribute]
pub fn injectable(_args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as Item);
    implement_injectable(&item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Allows binding the component to `dyn Trait + Send + Sync` when placed on `impl Trait for
/// Component`. The trait needs to be marked with `#[injectable]`.
#[proc_macro_attribute]
pub fn component_alias(_args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as Item);
    implement_component_alias(&item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
