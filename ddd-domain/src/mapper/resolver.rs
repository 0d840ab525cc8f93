use super::entity_mapper::EntityMapper;
use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

struct RegisteredMapper {
    entity_type: &'static str,
    // 实际类型为 Arc<dyn EntityMapper<E>>，键与值由同一泛型 E 生成
    mapper: Box<dyn Any + Send + Sync>,
}

/// 实体类型 → 映射器 的注册表
///
/// 启动时通过 `EntityMapperResolver::builder()` 一次性构建，之后只读。
pub struct EntityMapperResolver {
    mappers: HashMap<TypeId, RegisteredMapper>,
}

impl EntityMapperResolver {
    pub fn builder() -> EntityMapperResolverBuilder {
        EntityMapperResolverBuilder::default()
    }

    /// 按实体的具体类型精确查找映射器
    pub fn resolve<E: Entity>(&self) -> DomainResult<Arc<dyn EntityMapper<E>>> {
        self.mappers
            .get(&TypeId::of::<E>())
            .and_then(|m| m.mapper.downcast_ref::<Arc<dyn EntityMapper<E>>>())
            .cloned()
            .ok_or_else(|| DomainError::MapperNotFound {
                entity_type: E::TYPE.to_string(),
            })
    }

    pub fn contains<E: Entity>(&self) -> bool {
        self.mappers.contains_key(&TypeId::of::<E>())
    }

    /// 已注册的实体类型名（按名称排序）
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> = self.mappers.values().map(|m| m.entity_type).collect();
        types.sort_unstable();
        types
    }
}

#[derive(Default)]
pub struct EntityMapperResolverBuilder {
    mappers: HashMap<TypeId, RegisteredMapper>,
}

impl EntityMapperResolverBuilder {
    /// 注册映射器；同一实体类型重复注册视为配置错误
    pub fn register<E, M>(mut self, mapper: M) -> DomainResult<Self>
    where
        E: Entity,
        M: EntityMapper<E> + 'static,
    {
        let key = TypeId::of::<E>();
        if self.mappers.contains_key(&key) {
            return Err(DomainError::InvalidConfiguration {
                reason: format!("mapper already registered: entity_type={}", E::TYPE),
            });
        }

        let mapper: Arc<dyn EntityMapper<E>> = Arc::new(mapper);
        self.mappers.insert(
            key,
            RegisteredMapper {
                entity_type: E::TYPE,
                mapper: Box::new(mapper),
            },
        );

        Ok(self)
    }

    pub fn build(self) -> EntityMapperResolver {
        EntityMapperResolver {
            mappers: self.mappers,
        }
    }
}
