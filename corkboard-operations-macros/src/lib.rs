//! Procedural macros for defining operations
//!
//! This crate provides the `#[operation]` attribute macro, which attaches
//! verb/noun/description metadata to an operation struct.

use proc_macro::TokenStream;
use quote::quote;
use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    DeriveInput, Expr, ExprLit, Lit, LitStr, MetaNameValue, Token,
};

/// Attribute macro for defining an operation
///
/// # Usage
///
/// ```ignore
/// #[operation(verb = "move", noun = "card", description = "Move a card after an anchor")]
/// #[derive(Debug, Deserialize, Serialize)]
/// pub struct MoveCard {
///     pub id: CardId,
///     pub column_id: ColumnId,
///     pub anchor: Anchor<CardId>,
/// }
/// ```
#[proc_macro_attribute]
pub fn operation(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as OperationArgs);
    let input = parse_macro_input!(item as DeriveInput);

    if !matches!(input.data, syn::Data::Struct(_)) {
        return syn::Error::new_spanned(&input.ident, "operation macro only supports structs")
            .to_compile_error()
            .into();
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let OperationArgs {
        verb,
        noun,
        description,
    } = args;

    quote! {
        #input

        impl #impl_generics corkboard_operations::Operation for #name #ty_generics #where_clause {
            fn verb(&self) -> &'static str { #verb }
            fn noun(&self) -> &'static str { #noun }
            fn description(&self) -> &'static str { #description }
        }
    }
    .into()
}

/// `verb`, `noun` and `description`, each a string literal, in any order
struct OperationArgs {
    verb: LitStr,
    noun: LitStr,
    description: LitStr,
}

impl Parse for OperationArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let pairs = Punctuated::<MetaNameValue, Token![,]>::parse_terminated(input)?;
        let (mut verb, mut noun, mut description) = (None, None, None);

        for pair in pairs {
            let Expr::Lit(ExprLit {
                lit: Lit::Str(value),
                ..
            }) = &pair.value
            else {
                return Err(syn::Error::new_spanned(&pair.value, "expected a string literal"));
            };
            let slot = if pair.path.is_ident("verb") {
                &mut verb
            } else if pair.path.is_ident("noun") {
                &mut noun
            } else if pair.path.is_ident("description") {
                &mut description
            } else {
                return Err(syn::Error::new_spanned(
                    &pair.path,
                    "expected `verb`, `noun` or `description`",
                ));
            };
            if slot.replace(value.clone()).is_some() {
                return Err(syn::Error::new_spanned(&pair.path, "duplicate key"));
            }
        }

        let required = |value: Option<LitStr>, key: &str| {
            value.ok_or_else(|| syn::Error::new(Span::call_site(), format!("missing `{key}`")))
        };
        Ok(Self {
            verb: required(verb, "verb")?,
            noun: required(noun, "noun")?,
            description: required(description, "description")?,
        })
    }
}
