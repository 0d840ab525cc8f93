use syn::punctuated::Punctuated;
use syn::{Attribute, Path, Token};

/// 派生名按最后一段比较，`serde::Serialize` 与 `Serialize` 视为同一项
fn derive_name(path: &Path) -> Option<String> {
    path.segments.last().map(|seg| seg.ident.to_string())
}

/// 读取某个 `#[derive(...)]` 属性里的全部路径；非 derive 属性返回 `None`
fn derive_paths(attr: &Attribute) -> Option<Vec<Path>> {
    if !attr.path().is_ident("derive") {
        return None;
    }
    attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
        .ok()
        .map(|list| list.into_iter().collect())
}

/// 把宏要求的派生与用户已写的派生合并为唯一一个 `#[derive]`，放在属性最前
///
/// 要求项排在前面，用户的同名派生被吸收。
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<Path>) {
    let mut merged = required;
    let mut others = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        match derive_paths(&attr) {
            Some(paths) => {
                for path in paths {
                    let name = derive_name(&path);
                    if !merged.iter().any(|p| derive_name(p) == name) {
                        merged.push(path);
                    }
                }
            }
            None => others.push(attr),
        }
    }

    attrs.push(syn::parse_quote!(#[derive(#(#merged),*)]));
    attrs.extend(others);
}

/// 用户是否派生了 `Serialize` 或 `Deserialize`
pub(crate) fn derives_serde(attrs: &[Attribute]) -> bool {
    attrs.iter().filter_map(derive_paths).flatten().any(|path| {
        matches!(
            derive_name(&path).as_deref(),
            Some("Serialize" | "Deserialize")
        )
    })
}
