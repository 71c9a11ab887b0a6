//! 数据行切分
//!
//! 按头部声明的分隔符切分数据行，并与字段名/类型按位置配对成 [`RawRecord`]。

use crate::error::ParseError;
use crate::parser::header::LogHeader;
use crate::parser::record::{RawField, RawRecord};
use memchr::memchr_iter;
use std::sync::Arc;

/// 由头部派生的列定义
///
/// 字段名和类型只分配一次，之后每条记录共享引用。
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<(Arc<str>, Arc<str>)>,
    separator: String,
}

impl Schema {
    pub fn from_header(header: &LogHeader) -> Self {
        let columns = header
            .field_order
            .iter()
            .map(|name| {
                let field_type = header.field_type(name).unwrap_or_default();
                (Arc::from(name.as_str()), Arc::from(field_type))
            })
            .collect();

        Self {
            columns,
            separator: header.separator.clone(),
        }
    }

    /// 列数
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// 切分一条数据行
    ///
    /// # 参数
    ///
    /// * `line` - 不以 `#` 开头的数据行
    /// * `line_number` - 行号，仅用于错误信息
    ///
    /// # 错误
    ///
    /// 字段数与头部不一致时返回 `FieldCountMismatch`。
    pub fn tokenize(&self, line: &str, line_number: usize) -> Result<RawRecord, ParseError> {
        let tokens = split_fields(line, &self.separator);
        if tokens.len() != self.columns.len() {
            return Err(ParseError::FieldCountMismatch {
                line: line_number,
                expected: self.columns.len(),
                actual: tokens.len(),
            });
        }

        let fields = self
            .columns
            .iter()
            .zip(tokens)
            .enumerate()
            .map(|(idx, ((name, field_type), value))| {
                log::trace!("#{}: [{}:{}] {}", idx, name, field_type, value);
                RawField {
                    name: Arc::clone(name),
                    declared_type: Arc::clone(field_type),
                    raw_value: value.to_string(),
                }
            })
            .collect();

        Ok(RawRecord::new(fields))
    }
}

/// 按分隔符切分一行
///
/// 单字节分隔符走 memchr 快速路径。空行切分结果为一个空 token。
#[inline]
pub(crate) fn split_fields<'a>(line: &'a str, separator: &str) -> Vec<&'a str> {
    match separator.as_bytes() {
        [byte] => {
            let mut tokens = Vec::with_capacity(32);
            let mut start = 0;
            for pos in memchr_iter(*byte, line.as_bytes()) {
                tokens.push(&line[start..pos]);
                start = pos + 1;
            }
            tokens.push(&line[start..]);
            tokens
        }
        _ => line.split(separator).collect(),
    }
}

/// 使用头部直接切分一行（便捷函数）
///
/// 需要切分多行时应先构建 [`Schema`] 复用。
pub fn tokenize_line(header: &LogHeader, line: &str) -> Result<RawRecord, ParseError> {
    Schema::from_header(header).tokenize(line, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(fields: &[(&str, &str)]) -> LogHeader {
        LogHeader {
            field_order: fields.iter().map(|(n, _)| n.to_string()).collect(),
            field_types: fields
                .iter()
                .map(|(n, t)| (n.to_string(), t.to_string()))
                .collect(),
            ..LogHeader::default()
        }
    }

    #[test]
    fn tokenizes_dns_row() {
        let header = header(&[("ts", "time"), ("uid", "string")]);
        let record = tokenize_line(&header, "1592266854.705260\tCHhAvVGS1DHFjwGM9").unwrap();

        assert_eq!(record.len(), 2);
        assert_eq!(&*record.fields[0].name, "ts");
        assert_eq!(&*record.fields[0].declared_type, "time");
        assert_eq!(record.fields[0].raw_value, "1592266854.705260");
        assert_eq!(&*record.fields[1].name, "uid");
        assert_eq!(record.fields[1].raw_value, "CHhAvVGS1DHFjwGM9");
    }

    #[test]
    fn short_row_is_field_count_mismatch() {
        let header = header(&[("ts", "time"), ("uid", "string"), ("query", "string")]);
        let schema = Schema::from_header(&header);
        assert_eq!(
            schema.tokenize("1592266854.705260\tCHhAvVGS1DHFjwGM9", 12),
            Err(ParseError::FieldCountMismatch {
                line: 12,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn empty_values_are_kept() {
        let header = header(&[("a", "string"), ("b", "string"), ("c", "string")]);
        let record = tokenize_line(&header, "\t\t").unwrap();
        assert!(record.iter().all(|f| f.raw_value.is_empty()));
    }

    #[test]
    fn split_single_byte_and_multi_byte_separators() {
        assert_eq!(split_fields("a\tb\tc", "\t"), vec!["a", "b", "c"]);
        assert_eq!(split_fields("", "\t"), vec![""]);
        assert_eq!(split_fields("a::b", "::"), vec!["a", "b"]);
        assert_eq!(split_fields("é|ü", "|"), vec!["é", "ü"]);
    }

    #[test]
    fn schema_shares_names_between_records() {
        let header = header(&[("uid", "string")]);
        let schema = Schema::from_header(&header);
        let a = schema.tokenize("x", 1).unwrap();
        let b = schema.tokenize("y", 2).unwrap();
        assert!(Arc::ptr_eq(&a.fields[0].name, &b.fields[0].name));
        assert_eq!(schema.len(), 1);
    }
}
