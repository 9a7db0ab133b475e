extern crate proc_macro;
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error};

/// Derives `names()` on a command enum: the upper-cased name of every variant, which is how
/// clients spell the command on the wire. `ZRangeByScore` becomes `ZRANGEBYSCORE`.
#[proc_macro_derive(CommandNames)]
pub fn command_names_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let names = match input.data {
        Data::Enum(ref data_enum) => data_enum
            .variants
            .iter()
            .map(|v| v.ident.to_string().to_uppercase())
            .collect::<Vec<_>>(),
        _ => {
            return Error::new_spanned(name, "CommandNames can only be derived for enums")
                .to_compile_error()
                .into()
        }
    };

    let generated = quote! {
        impl #name {
            pub fn names() -> &'static [&'static str] {
                &[
                    #(#names),*
                ]
            }
        }
    };

    TokenStream::from(generated)
}
