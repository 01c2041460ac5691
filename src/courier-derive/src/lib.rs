mod impls;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::{Error as SynError, Result as SynResult};

/// Implements `Deliverable` from the constructor of an `impl` block.
///
/// Exactly one associated function must be annotated with `#[constructor]`.
/// Its first parameter may be annotated with `#[container]` to receive the
/// container, which declares the type as needing the container. Every other
/// parameter is pulled from the delivery's arguments in order.
#[proc_macro_attribute]
pub fn deliverable(attr: TokenStream, item: TokenStream) -> TokenStream {
    match deliverable_impl(attr, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn deliverable_impl(attr: TokenStream, item: TokenStream) -> SynResult<TokenStream2> {
    if !attr.is_empty() {
        let attr = TokenStream2::from(attr);
        return Err(SynError::new_spanned(
            attr,
            "`#[deliverable]` doesn't take any argument",
        ));
    }
    impls::expand_implementation(item)
}
