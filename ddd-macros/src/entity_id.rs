use crate::derive_utils::apply_derives;
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Fields, ItemStruct, LitBool, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// `#[entity_id]`：把单字段 tuple struct 变成可作 `Entity::Id` 的标识类型
///
/// 生成 `new`、`into_inner`、`Display` 与 `FromStr`（均委托给内部值），
/// 并补齐 `Clone`/`PartialEq`/`Eq`/`Hash`/serde 派生；`debug = false` 时不派生 `Debug`。
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let opts = parse_macro_input!(attr as IdOptions);
    let mut id_struct = parse_macro_input!(item as ItemStruct);

    let inner = match &id_struct.fields {
        Fields::Unnamed(f) if f.unnamed.len() == 1 => f.unnamed[0].ty.clone(),
        other => {
            return syn::Error::new(
                other.span(),
                "#[entity_id] expects a tuple struct with a single field, e.g. `struct OrderId(Uuid);`",
            )
            .to_compile_error()
            .into();
        }
    };

    let mut derives: Vec<syn::Path> = vec![
        syn::parse_quote!(Clone),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(Eq),
        syn::parse_quote!(Hash),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ];
    if opts.debug {
        derives.push(syn::parse_quote!(Debug));
    }
    apply_derives(&mut id_struct.attrs, derives);
    id_struct.attrs.push(syn::parse_quote!(#[serde(transparent)]));

    let name = &id_struct.ident;
    let (impl_g, ty_g, where_g) = id_struct.generics.split_for_impl();

    quote! {
        #id_struct

        impl #impl_g #name #ty_g #where_g {
            pub fn new(value: #inner) -> Self {
                Self(value)
            }

            pub fn into_inner(self) -> #inner {
                self.0
            }
        }

        impl #impl_g ::std::fmt::Display for #name #ty_g #where_g {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl #impl_g ::std::str::FromStr for #name #ty_g #where_g {
            type Err = <#inner as ::std::str::FromStr>::Err;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                s.parse::<#inner>().map(Self)
            }
        }
    }
    .into()
}

struct IdOptions {
    debug: bool,
}

impl Parse for IdOptions {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut opts = IdOptions { debug: true };
        if input.is_empty() {
            return Ok(opts);
        }

        let key: syn::Ident = input.parse()?;
        if key != "debug" {
            return Err(syn::Error::new(key.span(), "expected `debug = <bool>`"));
        }
        input.parse::<Token![=]>()?;
        opts.debug = input.parse::<LitBool>()?.value;
        if !input.is_empty() {
            return Err(input.error("unexpected tokens after `debug = <bool>`"));
        }

        Ok(opts)
    }
}
