use crate::error::{DomainError, DomainResult};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::slice::Iter;
use std::vec::IntoIter;

/// 字段取值快照：按字段声明顺序排列的 `(字段名, 规范值)` 列表
///
/// 规范值使用 `serde_json::Value`，对象按其序列化形态比较，`null` 只与 `null` 相等。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    values: Vec<(String, Value)>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加（或覆盖同名）字段
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field.into(), value.into());
        self
    }

    /// 以任意可序列化值追加字段
    pub fn try_with<T>(mut self, field: impl Into<String>, value: &T) -> DomainResult<Self>
    where
        T: Serialize + ?Sized,
    {
        self.insert(field.into(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    fn insert(&mut self, field: String, value: Value) {
        match self.values.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.values.push((field, value)),
        }
    }
}

impl<S> FromIterator<(S, Value)> for FieldValues
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |acc, (field, value)| acc.with(field, value))
    }
}

/// 单个字段的变更记录
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    field: String,
    old: Value,
    new: Value,
}

impl FieldChange {
    pub fn new(field: impl Into<String>, old: Value, new: Value) -> Self {
        Self {
            field: field.into(),
            old,
            new,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn old_value(&self) -> &Value {
        &self.old
    }

    pub fn new_value(&self) -> &Value {
        &self.new
    }

    /// 将新值反序列化为目标类型
    pub fn new_as<T: DeserializeOwned>(&self) -> DomainResult<T> {
        serde_json::from_value(self.new.clone()).map_err(|e| DomainError::Validation {
            reason: format!("field `{}`: {e}", self.field),
        })
    }
}

/// 一次变更记录的结果集合，按提交顺序排列，只包含确实发生变化的字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    /// 对比当前值与拟定值，得到变更集合
    ///
    /// 拟定值中出现、但当前快照没有的字段按 `null` 参与比较。
    pub fn diff(current: &FieldValues, proposed: &FieldValues) -> Self {
        let changes = proposed
            .iter()
            .filter_map(|(field, new)| {
                let old = current.get(field).cloned().unwrap_or(Value::Null);
                (old != *new).then(|| FieldChange::new(field, old, new.clone()))
            })
            .collect();

        Self { changes }
    }

    /// 把后续变更并入当前集合
    ///
    /// 同一字段保留最早的旧值、取最新的新值；合并后新旧值相等的字段被移除。
    pub fn merge(mut self, later: &ChangeSet) -> Self {
        for change in later {
            match self.changes.iter_mut().find(|c| c.field == change.field) {
                Some(existing) => existing.new = change.new.clone(),
                None => self.changes.push(change.clone()),
            }
        }
        self.changes.retain(|c| c.old != c.new);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.changes.iter().map(FieldChange::field).collect()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, FieldChange> {
        self.changes.iter()
    }
}

impl IntoIterator for ChangeSet {
    type Item = FieldChange;
    type IntoIter = IntoIter<FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a FieldChange;
    type IntoIter = Iter<'a, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
