//! 持久化记录（Record）
//!
//! 存储层的一行：`id`、`version`、`created_at`、`updated_at` 加领域列。
//! `exists` 标记该记录是否已有存储中的对应行，只由存储实现置位。
//!
use crate::entity::{Entity, Timestamps};
use crate::error::{DomainError, DomainResult};
use crate::value_object::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    table: String,
    id: String,
    version: Version,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    attributes: Map<String, Value>,
    #[serde(skip)]
    exists: bool,
}

impl Record {
    /// 构造尚未保存的新记录
    pub fn new(table: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id: id.into(),
            version: Version::new(),
            created_at: Utc::now(),
            updated_at: None,
            attributes: Map::new(),
            exists: false,
        }
    }

    /// 以实体的标识、时间戳与版本构造尚未保存的新记录
    pub fn for_entity<E: Entity>(table: impl Into<String>, entity: &E) -> Self {
        let ts = entity.timestamps();
        Self {
            version: entity.persisted_version(),
            created_at: ts.created_at,
            updated_at: ts.updated_at,
            ..Self::new(table, entity.id().to_string())
        }
    }

    /// 存储实现在读出或写入成功后调用，返回已持久化的记录
    pub fn persisted(mut self, version: Version, timestamps: Timestamps) -> Self {
        self.version = version;
        self.created_at = timestamps.created_at;
        self.updated_at = timestamps.updated_at;
        self.exists = true;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn timestamps(&self) -> Timestamps {
        Timestamps {
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn is_new(&self) -> bool {
        !self.exists
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// 读取领域列；缺失的列按 `null` 处理
    pub fn attribute<T: DeserializeOwned>(&self, name: &str) -> DomainResult<T> {
        let raw = self.attributes.get(name).cloned().unwrap_or(Value::Null);
        serde_json::from_value(raw).map_err(|e| DomainError::Parse {
            reason: format!("{}.{name}: {e}", self.table),
        })
    }

    pub fn set_attribute<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> DomainResult<()> {
        self.attributes
            .insert(name.to_string(), serde_json::to_value(value)?);
        Ok(())
    }
}
