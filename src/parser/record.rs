//! RawRecord 结构定义和相关方法
//!
//! RawRecord 表示一条数据行切分后的结果：按头部字段顺序排列的
//! (字段名, 声明类型, 原始值) 三元组，尚未做任何类型转换。

use std::sync::Arc;

/// 一行中的一个字段
///
/// 字段名和类型在同一文件的所有记录之间共享。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    /// 字段名，对应头部 `#fields`
    pub name: Arc<str>,

    /// 声明类型，对应头部 `#types`
    pub declared_type: Arc<str>,

    /// 未经转换的原始值
    pub raw_value: String,
}

impl RawField {
    pub fn new(name: &str, declared_type: &str, raw_value: &str) -> Self {
        Self {
            name: Arc::from(name),
            declared_type: Arc::from(declared_type),
            raw_value: raw_value.to_string(),
        }
    }
}

/// 一条数据行
///
/// 字段数量总是等于头部声明的字段数量。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    /// 按列顺序排列的字段
    pub fields: Vec<RawField>,
}

impl RawRecord {
    /// 创建新的记录
    pub fn new(fields: Vec<RawField>) -> Self {
        Self { fields }
    }

    /// 字段数量
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 是否没有任何字段
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 按字段名查找字段
    pub fn get(&self, name: &str) -> Option<&RawField> {
        self.fields.iter().find(|field| &*field.name == name)
    }

    /// 按字段名查找原始值
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(|field| field.raw_value.as_str())
    }

    /// 遍历所有字段
    pub fn iter(&self) -> std::slice::Iter<'_, RawField> {
        self.fields.iter()
    }
}

impl<'a> IntoIterator for &'a RawRecord {
    type Item = &'a RawField;
    type IntoIter = std::slice::Iter<'a, RawField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let record = RawRecord::new(vec![
            RawField::new("ts", "time", "1592266854.705260"),
            RawField::new("uid", "string", "CHhAvVGS1DHFjwGM9"),
        ]);

        assert_eq!(record.len(), 2);
        assert_eq!(record.value("uid"), Some("CHhAvVGS1DHFjwGM9"));
        assert_eq!(record.get("ts").map(|f| &*f.declared_type), Some("time"));
        assert!(record.get("query").is_none());
    }

    #[test]
    fn iterates_in_column_order() {
        let record = RawRecord::new(vec![
            RawField::new("a", "count", "1"),
            RawField::new("b", "count", "2"),
        ]);
        let names: Vec<&str> = record.iter().map(|f| &*f.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(!record.is_empty());
        assert!(RawRecord::default().is_empty());
    }
}
