//! http.log 映射

use super::{ConnId, FieldTable, ZeekEntry, convert};
use crate::error::ParseError;
use crate::parser_config::ParserConfig;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::fmt;
use std::path::Path;

/// http.log 中的一次请求/响应
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HttpEntry {
    pub ts: DateTime<Utc>,
    pub uid: String,
    pub id: ConnId,
    /// 在同一连接中的请求序号
    pub trans_depth: i64,
    pub method: String,
    pub host: String,
    pub uri: String,
    pub referrer: String,
    pub version: String,
    pub user_agent: String,
    pub origin: String,
    pub request_body_len: i64,
    pub response_body_len: i64,
    pub status_code: i64,
    pub status_msg: String,
}

static HTTP_FIELDS: Lazy<FieldTable<HttpEntry>> = Lazy::new(|| {
    FieldTable::new()
        .field("ts", |e: &mut HttpEntry, f, h| {
            e.ts = convert::time(f, h)?;
            Ok(())
        })
        .field("uid", |e, f, h| {
            e.uid = convert::string(f, h);
            Ok(())
        })
        .conn_id(|e| &mut e.id)
        .field("trans_depth", |e, f, h| {
            e.trans_depth = convert::count(f, h)?;
            Ok(())
        })
        .field("method", |e, f, h| {
            e.method = convert::string(f, h);
            Ok(())
        })
        .field("host", |e, f, h| {
            e.host = convert::string(f, h);
            Ok(())
        })
        .field("uri", |e, f, h| {
            e.uri = convert::string(f, h);
            Ok(())
        })
        .field("referrer", |e, f, h| {
            e.referrer = convert::string(f, h);
            Ok(())
        })
        .field("version", |e, f, h| {
            e.version = convert::string(f, h);
            Ok(())
        })
        .field("user_agent", |e, f, h| {
            e.user_agent = convert::string(f, h);
            Ok(())
        })
        .field("origin", |e, f, h| {
            e.origin = convert::string(f, h);
            Ok(())
        })
        .field("request_body_len", |e, f, h| {
            e.request_body_len = convert::count(f, h)?;
            Ok(())
        })
        .field("response_body_len", |e, f, h| {
            e.response_body_len = convert::count(f, h)?;
            Ok(())
        })
        .field("status_code", |e, f, h| {
            e.status_code = convert::count(f, h)?;
            Ok(())
        })
        .field("status_msg", |e, f, h| {
            e.status_msg = convert::string(f, h);
            Ok(())
        })
});

impl ZeekEntry for HttpEntry {
    const LOG_PATH: &'static str = "http";

    fn field_table() -> &'static FieldTable<Self> {
        &HTTP_FIELDS
    }
}

impl fmt::Display for HttpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}{} -> {}",
            self.ts, self.method, self.host, self.uri, self.status_code
        )
    }
}

/// 解析单个 http.log
pub fn parse_http_log<P: AsRef<Path>>(path: P) -> Result<Vec<HttpEntry>, ParseError> {
    super::parse_log(path)
}

/// 递归解析目录下所有 http 日志
pub fn parse_http_recurse<P: AsRef<Path>>(dir: P) -> Result<Vec<HttpEntry>, ParseError> {
    super::parse_recurse(dir)
}

/// 解析某一天的 http 日志
pub fn http_for_day(day: &str, config: &ParserConfig) -> Result<Vec<HttpEntry>, ParseError> {
    super::parse_for_day(day, config)
}
