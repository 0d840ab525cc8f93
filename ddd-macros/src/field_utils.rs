use syn::{Field, FieldsNamed, Token, punctuated::Punctuated};

fn field_named<'a>(named: &'a Punctuated<Field, Token![,]>, name: &str) -> Option<&'a Field> {
    named
        .iter()
        .find(|f| f.ident.as_ref().map(|i| i == name).unwrap_or(false))
}

/// 确保具名字段结构体/变体包含所需字段
/// - required: 按给定顺序处理的完整字段定义（含属性与类型）
/// - reposition_existing: 若为 true，所需字段一律移至最前，已存在的复用原定义（entity 需要）；
///   若为 false，则仅在缺失时追加到最前，保留既有顺序（domain_event 需要）。
pub(crate) fn ensure_required_fields(
    fields_named: &mut FieldsNamed,
    required: Vec<Field>,
    reposition_existing: bool,
) {
    let old_named = fields_named.named.clone();
    let mut new_named: Punctuated<Field, Token![,]> = Punctuated::new();
    let required_name = |f: &Field| f.ident.as_ref().map(|i| i.to_string());

    for field in required.iter() {
        let Some(name) = required_name(field) else {
            continue;
        };
        match field_named(&old_named, &name) {
            Some(existing) if reposition_existing => new_named.push(existing.clone()),
            Some(_) => {}
            None => new_named.push(field.clone()),
        }
    }

    for f in old_named.into_iter() {
        let moved = reposition_existing
            && f.ident.as_ref().is_some_and(|i| {
                required
                    .iter()
                    .any(|r| r.ident.as_ref().is_some_and(|n| n == i))
            });
        if !moved {
            new_named.push(f);
        }
    }

    fields_named.named = new_named;
}
