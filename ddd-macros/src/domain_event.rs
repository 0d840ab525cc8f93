use crate::derive_utils::apply_derives;
use crate::field_utils::ensure_required_fields;
use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, Field, Ident, Item, LitStr, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[domain_event] 宏实现
/// - 仅支持枚举，且变体必须是具名字段：`Variant { .. }`
/// - 确保每个变体具备字段 `base: ::ddd_domain::domain_event::BaseEvent`
/// - 生成 `::ddd_domain::domain_event::DomainEvent` 实现（event_name/base）
/// - 变体可覆写事件名：`#[event(name = "...")]`，默认 `Enum.Variant`
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[domain_event] takes no arguments; name variants with #[event(name = ...)]",
        )
        .to_compile_error()
        .into();
    }
    let mut input = parse_macro_input!(item as Item);

    let enum_item = match &mut input {
        Item::Enum(e) => e,
        other => {
            return syn::Error::new(
                other.span(),
                "#[domain_event] can only be used on enum types",
            )
            .to_compile_error()
            .into();
        }
    };

    // 合并/追加默认派生：Debug, Clone
    let required: Vec<syn::Path> = vec![syn::parse_quote!(Debug), syn::parse_quote!(Clone)];
    apply_derives(&mut enum_item.attrs, required);

    let mut variant_names: HashMap<String, LitStr> = HashMap::new();

    for v in &mut enum_item.variants {
        let variant_span = v.span();
        let syn::Fields::Named(fields_named) = &mut v.fields else {
            return syn::Error::new(
                variant_span,
                "#[domain_event] supports only named-field enum variants, e.g., Variant { x: T }",
            )
            .to_compile_error()
            .into();
        };

        let base: Field = syn::parse_quote! { base: ::ddd_domain::domain_event::BaseEvent };
        ensure_required_fields(fields_named, vec![base], /*reposition_existing*/ false);

        let mut retained_attrs = Vec::new();
        for attr in v.attrs.iter() {
            if !attr.path().is_ident("event") {
                retained_attrs.push(attr.clone());
                continue;
            }
            let lit = match parse_variant_event_attr(attr) {
                Ok(lit) => lit,
                Err(err) => return err.to_compile_error().into(),
            };
            if variant_names.insert(v.ident.to_string(), lit).is_some() {
                return syn::Error::new(attr.span(), "duplicate 'name' specified for this variant")
                    .to_compile_error()
                    .into();
            }
        }
        v.attrs = retained_attrs;
    }

    let enum_ident = &enum_item.ident;
    let enum_name_string = enum_ident.to_string();

    let name_match_arms = enum_item.variants.iter().map(|v| {
        let v_ident = &v.ident;
        let key = v_ident.to_string();
        let lit = variant_names.get(&key).cloned().unwrap_or_else(|| {
            LitStr::new(&format!("{}.{}", enum_name_string, key), v_ident.span())
        });
        quote! { Self::#v_ident { .. } => #lit }
    });

    let base_match_arms = enum_item.variants.iter().map(|v| {
        let v_ident = &v.ident;
        quote! { Self::#v_ident { base, .. } => base }
    });

    let (impl_generics, ty_generics, where_clause) = enum_item.generics.split_for_impl();

    let out = quote! {
        #enum_item

        impl #impl_generics ::ddd_domain::domain_event::DomainEvent for #enum_ident #ty_generics #where_clause {
            fn event_name(&self) -> &str { match self { #( #name_match_arms, )* } }
            fn base(&self) -> &::ddd_domain::domain_event::BaseEvent { match self { #( #base_match_arms, )* } }
        }
    };

    TokenStream::from(out)
}

// -------- parsing --------

fn parse_variant_event_attr(attr: &syn::Attribute) -> Result<LitStr> {
    let syn::Meta::List(_) = &attr.meta else {
        return Err(syn::Error::new(attr.span(), "expected #[event(name = \"...\")]"));
    };

    let mut name: Option<LitStr> = None;
    let pairs: Punctuated<VariantEventAttrKv, Token![,]> =
        attr.parse_args_with(Punctuated::<VariantEventAttrKv, Token![,]>::parse_terminated)?;

    for kv in pairs {
        if kv.key != "name" {
            return Err(syn::Error::new(kv.key.span(), "unknown key; expected 'name'"));
        }
        if name.is_some() {
            return Err(syn::Error::new(
                kv.key.span(),
                "duplicate key 'name' in attribute",
            ));
        }
        match kv.value {
            Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            }) => name = Some(lit),
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "expected string literal for 'name'",
                ));
            }
        }
    }

    name.ok_or_else(|| syn::Error::new(attr.span(), "missing 'name' in #[event(...)]"))
}

struct VariantEventAttrKv {
    key: Ident,
    value: Expr,
}

impl Parse for VariantEventAttrKv {
    fn parse(input: ParseStream) -> Result<Self> {
        let key = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        Ok(Self {
            key,
            value: input.parse()?,
        })
    }
}
