//! DDD 领域层基础库（ddd-domain）
//!
//! 提供聚合持久化协议所需的通用构件：
//! - 实体（`entity`）：标识、时间戳、版本与字段级变更台账
//! - 聚合根（`aggregate_root`）：在实体之上增加待发布事件台账
//! - 领域事件（`domain_event`）与事件发布（`eventing`）
//! - 实体映射（`mapper`）：领域对象与持久化记录之间的双向转换及按类型解析
//! - 仓储（`persist`）：乐观锁、条件写入、写后发布与删除语义
//! - 值对象（`value_object`）与错误分类（`error`）
//!
//! 本 crate 不绑定具体存储：持久化引擎通过 `persist::RecordStore` 接入，
//! 事件投递通过 `eventing::DomainEventPublisher` 接入，二者都附带一个内存实现。
//!
//! 典型用法：
//! 1. 用 `#[entity]`（`ddd-macros`）定义聚合，实现 `TrackChanges` 完成字段写回；
//! 2. 为聚合编写 `EntityMapper` 并注册到 `EntityMapperResolver`；
//! 3. 用存储、发布器与配置创建 `Repository`，通过 `save/delete` 编排一次完整的写入与发布。
//!
pub mod aggregate_root;
pub mod domain_event;
pub mod entity;
pub mod error;
pub mod eventing;
pub mod mapper;
pub mod persist;
pub mod value_object;

// 允许在本 crate 内部通过 ::ddd_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::ddd_domain 路径。
extern crate self as ddd_domain;
