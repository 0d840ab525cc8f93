//! 实体映射（mapper）
//!
//! - `EntityMapper`：领域对象 ↔ 持久化记录的纯转换；
//! - `EntityMapperResolver`：启动时构建的 类型 → 映射器 注册表，按具体类型精确解析，
//!   未注册的类型以 `MapperNotFound` 失败。
//!
mod entity_mapper;
mod resolver;

pub use entity_mapper::EntityMapper;
pub use resolver::{EntityMapperResolver, EntityMapperResolverBuilder};
