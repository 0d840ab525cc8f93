use crate::derive_utils::{apply_derives, derives_serde};
use crate::field_utils::ensure_required_fields;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Field, Item, ItemStruct, LitStr, Result, Token, Type, parse::Parse, parse::ParseStream,
    parse_macro_input,
};

/// #[entity] 宏实现
/// - 注入字段 `state: EntityState<Id>`；给出 `event` 时再注入 `events: EventLog<Event>`，均置于最前
/// - 实现 `::ddd_domain::entity::Entity`，并按标识实现 `PartialEq`
/// - 给出 `event` 时实现 `::ddd_domain::aggregate_root::AggregateRoot`
/// - 支持参数：`#[entity(id = IdType, event = EventType, name = "...", debug = true|false)]`；
///   - `id` 默认 `String`
///   - `name` 默认结构体名，作为 `Entity::TYPE`
///   - `debug` 默认 `true`（派生 Debug）。当为 `false` 时不派生 Debug，便于用户自定义实现。
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as EntityAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[entity] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let with_serde = derives_serde(&st.attrs);

    // 仅支持具名字段结构体
    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.span(), "only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let id_type = cfg.id_ty.unwrap_or_else(|| syn::parse_quote! { String });

    let mut required: Vec<Field> = vec![syn::parse_quote! {
        state: ::ddd_domain::entity::EntityState<#id_type>
    }];
    if let Some(event_ty) = &cfg.event_ty {
        let skip = with_serde.then(|| quote! { #[serde(skip)] });
        required.push(syn::parse_quote! {
            #skip
            events: ::ddd_domain::aggregate_root::EventLog<#event_ty>
        });
    }
    ensure_required_fields(fields_named, required, /*reposition_existing*/ true);

    // 合并/规范 derive：Clone 必选，Debug 可通过 debug=false 关闭
    let mut derives: Vec<syn::Path> = vec![syn::parse_quote!(Clone)];
    if cfg.derive_debug.unwrap_or(true) {
        derives.insert(0, syn::parse_quote!(Debug));
    }
    apply_derives(&mut st.attrs, derives);

    let out_struct = ItemStruct { ..st };

    let ident = &out_struct.ident;
    let type_name = cfg
        .name
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
    let generics = out_struct.generics.clone();
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let aggregate_impl = cfg.event_ty.as_ref().map(|event_ty| {
        quote! {
            impl #impl_generics ::ddd_domain::aggregate_root::AggregateRoot for #ident #ty_generics #where_clause {
                type Event = #event_ty;

                fn event_log(&self) -> &::ddd_domain::aggregate_root::EventLog<Self::Event> {
                    &self.events
                }

                fn event_log_mut(&mut self) -> &mut ::ddd_domain::aggregate_root::EventLog<Self::Event> {
                    &mut self.events
                }
            }
        }
    });

    let expanded = quote! {
        #out_struct

        impl #impl_generics ::ddd_domain::entity::Entity for #ident #ty_generics #where_clause {
            type Id = #id_type;

            const TYPE: &'static str = #type_name;

            fn state(&self) -> &::ddd_domain::entity::EntityState<Self::Id> {
                &self.state
            }

            fn state_mut(&mut self) -> &mut ::ddd_domain::entity::EntityState<Self::Id> {
                &mut self.state
            }
        }

        impl #impl_generics ::core::cmp::PartialEq for #ident #ty_generics #where_clause {
            fn eq(&self, other: &Self) -> bool {
                ::ddd_domain::entity::Entity::id(self) == ::ddd_domain::entity::Entity::id(other)
            }
        }

        #aggregate_impl
    };

    TokenStream::from(expanded)
}

// -------- parsing --------

#[derive(Default)]
struct EntityAttrConfig {
    id_ty: Option<Type>,
    event_ty: Option<Type>,
    name: Option<LitStr>,
    derive_debug: Option<bool>,
}

impl Parse for EntityAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = Self::default();

        if input.is_empty() {
            return Ok(cfg);
        }

        let elems: Punctuated<EntityAttrElem, Token![,]> =
            Punctuated::<EntityAttrElem, Token![,]>::parse_terminated(input)?;

        for elem in elems.into_iter() {
            let key = elem.key();
            let duplicate = match elem {
                EntityAttrElem::Id(ty) => cfg.id_ty.replace(*ty).is_some(),
                EntityAttrElem::Event(ty) => cfg.event_ty.replace(*ty).is_some(),
                EntityAttrElem::Name(lit) => {
                    if lit.value().trim().is_empty() {
                        return Err(syn::Error::new(lit.span(), "'name' must not be empty"));
                    }
                    cfg.name.replace(lit).is_some()
                }
                EntityAttrElem::Debug(b) => cfg.derive_debug.replace(b).is_some(),
            };
            if duplicate {
                return Err(syn::Error::new(
                    proc_macro2::Span::call_site(),
                    format!("duplicate key '{key}' in attribute"),
                ));
            }
        }

        Ok(cfg)
    }
}

enum EntityAttrElem {
    Id(Box<Type>),
    Event(Box<Type>),
    Name(LitStr),
    Debug(bool),
}

impl EntityAttrElem {
    fn key(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Event(_) => "event",
            Self::Name(_) => "name",
            Self::Debug(_) => "debug",
        }
    }
}

impl Parse for EntityAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        if key == "id" {
            Ok(EntityAttrElem::Id(Box::new(input.parse()?)))
        } else if key == "event" {
            Ok(EntityAttrElem::Event(Box::new(input.parse()?)))
        } else if key == "name" {
            Ok(EntityAttrElem::Name(input.parse()?))
        } else if key == "debug" {
            let expr: syn::Expr = input.parse()?;
            match expr {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Bool(b),
                    ..
                }) => Ok(EntityAttrElem::Debug(b.value())),
                other => Err(syn::Error::new(
                    other.span(),
                    "expected boolean literal for 'debug'",
                )),
            }
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'id' | 'event' | 'name' | 'debug'",
            ))
        }
    }
}
