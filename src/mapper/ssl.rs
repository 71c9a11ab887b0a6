//! ssl.log 映射

use super::{ConnId, FieldTable, ZeekEntry, convert};
use crate::error::ParseError;
use crate::parser::{LogHeader, RawField};
use crate::parser_config::ParserConfig;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::fmt;
use std::path::Path;

/// ssl.log 中的一次 TLS 握手
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SslEntry {
    pub ts: DateTime<Utc>,
    pub uid: String,
    pub id: ConnId,
    /// 服务端选择的 SSL/TLS 版本
    pub version: String,
    pub cipher: String,
    /// ECDH/ECDHE 曲线
    pub curve: String,
    /// SNI
    pub server_name: String,
    pub resumed: bool,
    /// 握手是否完成
    pub established: bool,
    pub server_subject: String,
    pub server_issuer: String,
    pub client_subject: String,
    pub client_issuer: String,
    /// 证书链校验结果
    pub validation_status: String,
}

fn set_validation(e: &mut SslEntry, f: &RawField, h: &LogHeader) {
    e.validation_status = convert::string(f, h);
}

static SSL_FIELDS: Lazy<FieldTable<SslEntry>> = Lazy::new(|| {
    FieldTable::new()
        .field("ts", |e: &mut SslEntry, f, h| {
            e.ts = convert::time(f, h)?;
            Ok(())
        })
        .field("uid", |e, f, h| {
            e.uid = convert::string(f, h);
            Ok(())
        })
        .conn_id(|e| &mut e.id)
        .field("version", |e, f, h| {
            e.version = convert::string(f, h);
            Ok(())
        })
        .field("cipher", |e, f, h| {
            e.cipher = convert::string(f, h);
            Ok(())
        })
        .field("curve", |e, f, h| {
            e.curve = convert::string(f, h);
            Ok(())
        })
        .field("server_name", |e, f, h| {
            e.server_name = convert::string(f, h);
            Ok(())
        })
        .field("resumed", |e, f, h| {
            e.resumed = convert::boolean(f, h)?;
            Ok(())
        })
        .field("established", |e, f, h| {
            e.established = convert::boolean(f, h)?;
            Ok(())
        })
        .field("subject", |e, f, h| {
            e.server_subject = convert::string(f, h);
            Ok(())
        })
        .field("issuer", |e, f, h| {
            e.server_issuer = convert::string(f, h);
            Ok(())
        })
        .field("client_subject", |e, f, h| {
            e.client_subject = convert::string(f, h);
            Ok(())
        })
        .field("client_issuer", |e, f, h| {
            e.client_issuer = convert::string(f, h);
            Ok(())
        })
        // 旧版 Zeek 输出 `validation`
        .field("validation", |e, f, h| {
            set_validation(e, f, h);
            Ok(())
        })
        .field("validation_status", |e, f, h| {
            set_validation(e, f, h);
            Ok(())
        })
});

impl ZeekEntry for SslEntry {
    const LOG_PATH: &'static str = "ssl";

    fn field_table() -> &'static FieldTable<Self> {
        &SSL_FIELDS
    }
}

impl fmt::Display for SslEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}  {}", self.ts, self.id, self.server_name)
    }
}

/// 解析单个 ssl.log
pub fn parse_ssl_log<P: AsRef<Path>>(path: P) -> Result<Vec<SslEntry>, ParseError> {
    super::parse_log(path)
}

/// 递归解析目录下所有 ssl 日志
pub fn parse_ssl_recurse<P: AsRef<Path>>(dir: P) -> Result<Vec<SslEntry>, ParseError> {
    super::parse_recurse(dir)
}

/// 解析某一天的 ssl 日志
pub fn ssl_for_day(day: &str, config: &ParserConfig) -> Result<Vec<SslEntry>, ParseError> {
    super::parse_for_day(day, config)
}
