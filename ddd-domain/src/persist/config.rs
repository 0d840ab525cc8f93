use bon::Builder;
use serde::{Deserialize, Serialize};

/// 批量删除遇到失败时的策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkDeletePolicy {
    /// 逐个删除，遇到第一个失败即停止并返回该错误（已删除的不回滚）
    #[default]
    AbortOnFirstFailure,
    /// 逐个删除，失败的记入报告后继续
    ContinueOnFailure,
}

/// 仓储配置
///
/// ```
/// use ddd_domain::persist::{BulkDeletePolicy, RepositoryConfig};
///
/// let cfg: RepositoryConfig =
///     serde_json::from_str(r#"{"bulk_delete": "continue_on_failure"}"#).unwrap();
/// assert_eq!(cfg.bulk_delete(), BulkDeletePolicy::ContinueOnFailure);
/// assert!(!cfg.deep_hydration());
/// ```
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    #[builder(default)]
    bulk_delete: BulkDeletePolicy,
    /// 读取时是否一并装载关联（传给 `EntityMapper::to_entity` 的 `deep`）
    #[builder(default)]
    deep_hydration: bool,
}

impl RepositoryConfig {
    pub fn bulk_delete(&self) -> BulkDeletePolicy {
        self.bulk_delete
    }

    pub fn deep_hydration(&self) -> bool {
        self.deep_hydration
    }
}
