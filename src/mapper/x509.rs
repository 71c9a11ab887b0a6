//! x509.log 映射

use super::{FieldTable, ZeekEntry, convert};
use crate::error::ParseError;
use crate::parser_config::ParserConfig;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::fmt;
use std::path::Path;

/// 证书有效期的显示格式
const VALIDITY_DATE_FMT: &str = "%m/%d/%y";

/// x509.log 中的一张证书
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct X509Entry {
    pub ts: DateTime<Utc>,
    /// 文件 ID（fuid）
    pub id: String,
    pub cert_version: i64,
    pub cert_serial: String,
    pub cert_subject: String,
    pub cert_issuer: String,
    pub cert_not_valid_before: Option<DateTime<Utc>>,
    pub cert_not_valid_after: Option<DateTime<Utc>>,
    pub cert_key_alg: String,
    pub cert_sig_alg: String,
    /// rsa、dsa、ecdsa 等
    pub cert_key_type: String,
    /// 密钥长度（位）
    pub cert_key_length: i64,
}

impl X509Entry {
    /// 证书在给定时刻是否处于有效期内
    ///
    /// 缺少任一边界时返回 `false`。
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        match (self.cert_not_valid_before, self.cert_not_valid_after) {
            (Some(before), Some(after)) => before <= at && at <= after,
            _ => false,
        }
    }
}

static X509_FIELDS: Lazy<FieldTable<X509Entry>> = Lazy::new(|| {
    FieldTable::new()
        .field("ts", |e: &mut X509Entry, f, h| {
            e.ts = convert::time(f, h)?;
            Ok(())
        })
        .field("id", |e, f, h| {
            e.id = convert::string(f, h);
            Ok(())
        })
        .field("certificate.version", |e, f, h| {
            e.cert_version = convert::count(f, h)?;
            Ok(())
        })
        .field("certificate.serial", |e, f, h| {
            e.cert_serial = convert::string(f, h);
            Ok(())
        })
        .field("certificate.subject", |e, f, h| {
            e.cert_subject = convert::string(f, h);
            Ok(())
        })
        .field("certificate.issuer", |e, f, h| {
            e.cert_issuer = convert::string(f, h);
            Ok(())
        })
        .field("certificate.not_valid_before", |e, f, h| {
            e.cert_not_valid_before = convert::opt_time(f, h)?;
            Ok(())
        })
        .field("certificate.not_valid_after", |e, f, h| {
            e.cert_not_valid_after = convert::opt_time(f, h)?;
            Ok(())
        })
        .field("certificate.key_alg", |e, f, h| {
            e.cert_key_alg = convert::string(f, h);
            Ok(())
        })
        .field("certificate.sig_alg", |e, f, h| {
            e.cert_sig_alg = convert::string(f, h);
            Ok(())
        })
        .field("certificate.key_type", |e, f, h| {
            e.cert_key_type = convert::string(f, h);
            Ok(())
        })
        .field("certificate.key_length", |e, f, h| {
            e.cert_key_length = convert::count(f, h)?;
            Ok(())
        })
});

impl ZeekEntry for X509Entry {
    const LOG_PATH: &'static str = "x509";

    fn field_table() -> &'static FieldTable<Self> {
        &X509_FIELDS
    }
}

fn validity_date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|ts| ts.format(VALIDITY_DATE_FMT).to_string())
        .unwrap_or_else(|| "?".to_string())
}

impl fmt::Display for X509Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} bit {} cert: {} validity:{}--{} issuer:{}",
            self.ts,
            self.cert_key_length,
            self.cert_key_type,
            self.cert_subject,
            validity_date(self.cert_not_valid_before),
            validity_date(self.cert_not_valid_after),
            self.cert_issuer
        )
    }
}

/// 解析单个 x509.log
pub fn parse_x509_log<P: AsRef<Path>>(path: P) -> Result<Vec<X509Entry>, ParseError> {
    super::parse_log(path)
}

/// 递归解析目录下所有 x509 日志
pub fn parse_x509_recurse<P: AsRef<Path>>(dir: P) -> Result<Vec<X509Entry>, ParseError> {
    super::parse_recurse(dir)
}

/// 解析某一天的 x509 日志
pub fn x509_for_day(day: &str, config: &ParserConfig) -> Result<Vec<X509Entry>, ParseError> {
    super::parse_for_day(day, config)
}
