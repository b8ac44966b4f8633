use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_subset;

#[proc_macro_derive(FromSubset, attributes(var))]
pub fn derive_from_subset(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match from_subset::expand_from_subset(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
