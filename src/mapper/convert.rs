//! 字段值转换函数
//!
//! 所有函数都以 [`RawField`] 为输入，出错时用字段名构造 `InvalidValue`。
//! 未设置（`-`）的取值约定：
//!
//! | 类型 | 未设置时 |
//! |------|----------|
//! | count / int / port | `-1` |
//! | interval / double | `-1.0` |
//! | bool | `false`（或 `None`） |
//! | string / addr | 空字符串 |
//! | set / vector | 空 `Vec` |

use crate::error::ParseError;
use crate::parser::{LogHeader, RawField};
use crate::tools::unix_str_to_time;
use chrono::{DateTime, Utc};

/// 计数类字段未设置时的值
pub const UNSET_COUNT: i64 = -1;

/// 浮点类字段未设置时的值
pub const UNSET_INTERVAL: f64 = -1.0;

fn invalid(field: &RawField, reason: &str) -> ParseError {
    ParseError::InvalidValue {
        field: field.name.to_string(),
        value: field.raw_value.clone(),
        reason: reason.to_string(),
    }
}

/// 字符串，未设置时为空
pub fn string(field: &RawField, header: &LogHeader) -> String {
    if header.is_unset(&field.raw_value) {
        String::new()
    } else {
        field.raw_value.clone()
    }
}

/// count / int / port
pub fn count(field: &RawField, header: &LogHeader) -> Result<i64, ParseError> {
    if header.is_unset(&field.raw_value) {
        return Ok(UNSET_COUNT);
    }
    field
        .raw_value
        .parse()
        .map_err(|_| invalid(field, "not an integer"))
}

/// interval / double
pub fn interval(field: &RawField, header: &LogHeader) -> Result<f64, ParseError> {
    if header.is_unset(&field.raw_value) {
        return Ok(UNSET_INTERVAL);
    }
    field
        .raw_value
        .parse()
        .map_err(|_| invalid(field, "not a number"))
}

/// `T` / `F`，未设置为 `false`
pub fn boolean(field: &RawField, header: &LogHeader) -> Result<bool, ParseError> {
    Ok(opt_boolean(field, header)?.unwrap_or(false))
}

/// `T` / `F`，未设置为 `None`
pub fn opt_boolean(field: &RawField, header: &LogHeader) -> Result<Option<bool>, ParseError> {
    match field.raw_value.as_str() {
        "T" => Ok(Some(true)),
        "F" => Ok(Some(false)),
        value if header.is_unset(value) => Ok(None),
        _ => Err(invalid(field, "expected T or F")),
    }
}

/// Unix 时间戳
pub fn time(field: &RawField, _header: &LogHeader) -> Result<DateTime<Utc>, ParseError> {
    unix_str_to_time(&field.raw_value).ok_or_else(|| invalid(field, "not a unix timestamp"))
}

/// 可以未设置的 Unix 时间戳
pub fn opt_time(
    field: &RawField,
    header: &LogHeader,
) -> Result<Option<DateTime<Utc>>, ParseError> {
    if header.is_unset(&field.raw_value) {
        return Ok(None);
    }
    time(field, header).map(Some)
}

fn set_items<'a>(field: &'a RawField, header: &LogHeader) -> Vec<&'a str> {
    let value = field.raw_value.as_str();
    if header.is_unset(value) || header.is_empty_set(value) || value.is_empty() {
        return Vec::new();
    }
    value.split(header.set_separator.as_str()).collect()
}

/// 字符串集合，按集合分隔符切分
pub fn string_set(field: &RawField, header: &LogHeader) -> Vec<String> {
    set_items(field, header)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// 浮点集合（如 DNS 的 TTLs）
pub fn interval_set(field: &RawField, header: &LogHeader) -> Result<Vec<f64>, ParseError> {
    set_items(field, header)
        .into_iter()
        .map(|item| item.parse().map_err(|_| invalid(field, "not a number")))
        .collect()
}
