//! 领域建模过程宏
//!
//! - `#[entity]`：为具名字段结构体注入实体状态（及可选的事件台账），实现 `Entity`/`AggregateRoot`
//! - `#[entity_id]`：为单字段 tuple struct 生成可用作实体标识的包装类型
//! - `#[domain_event]`：为事件枚举补齐 `base` 字段并实现 `DomainEvent`
//!
use proc_macro::TokenStream;

mod derive_utils;
mod domain_event;
mod entity;
mod entity_id;
mod field_utils;

/// 实体/聚合根宏
///
/// ```ignore
/// #[entity(id = OrderId, event = OrderEvent, name = "order")]
/// struct Order {
///     customer: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(attr, item)
}

/// 实体 ID 宏
/// 用于 `struct OrderId(Uuid);` 这类包装类型，仅支持单字段的 `tuple struct`。
#[proc_macro_attribute]
pub fn entity_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_id::expand(attr, item)
}

/// 领域事件宏
#[proc_macro_attribute]
pub fn domain_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    domain_event::expand(attr, item)
}
