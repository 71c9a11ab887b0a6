//! dns.log 映射
//!
//! 字段定义见 Zeek 的 `DNS::Info`。注意 `AA`、`TC`、`RD`、`RA`、`Z`、`TTLs`
//! 在日志中是大写字段名。

use super::{ConnId, FieldTable, Proto, ZeekEntry, convert};
use crate::error::ParseError;
use crate::parser_config::ParserConfig;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::fmt;
use std::path::Path;

/// 反向解析使用的域名后缀
const RDNS_SUFFIXES: [&str; 2] = [".in-addr.arpa", ".ip6.arpa"];

/// dns.log 中的一条查询
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DnsEntry {
    pub ts: DateTime<Utc>,
    pub uid: String,
    pub id: ConnId,
    pub proto: Proto,
    /// 查询方生成的事务 ID
    pub trans_id: i64,
    /// 查询到响应的往返时间（秒）
    pub rtt: f64,
    pub query: String,
    pub qclass: i64,
    pub qclass_name: String,
    pub qtype: i64,
    pub qtype_name: String,
    pub rcode: i64,
    pub rcode_name: String,
    /// 权威应答
    pub aa: bool,
    /// 截断
    pub tc: bool,
    /// 期望递归
    pub rd: bool,
    /// 支持递归
    pub ra: bool,
    /// 保留位，通常为 0
    pub z: i64,
    pub answers: Vec<String>,
    pub ttls: Vec<f64>,
    pub rejected: bool,
}

impl DnsEntry {
    /// 是否为反向（PTR）查询
    pub fn is_rdns_lookup(&self) -> bool {
        if self.qtype_name.eq_ignore_ascii_case("PTR") {
            return true;
        }
        let query = self.query.to_ascii_lowercase();
        RDNS_SUFFIXES.iter().any(|suffix| query.ends_with(suffix))
    }
}

static DNS_FIELDS: Lazy<FieldTable<DnsEntry>> = Lazy::new(|| {
    FieldTable::new()
        .field("ts", |e: &mut DnsEntry, f, h| {
            e.ts = convert::time(f, h)?;
            Ok(())
        })
        .field("uid", |e, f, h| {
            e.uid = convert::string(f, h);
            Ok(())
        })
        .conn_id(|e| &mut e.id)
        .field("proto", |e, f, _| {
            e.proto = Proto::from_zeek(&f.raw_value);
            Ok(())
        })
        .field("trans_id", |e, f, h| {
            e.trans_id = convert::count(f, h)?;
            Ok(())
        })
        .field("rtt", |e, f, h| {
            e.rtt = convert::interval(f, h)?;
            Ok(())
        })
        .field("query", |e, f, h| {
            e.query = convert::string(f, h);
            Ok(())
        })
        .field("qclass", |e, f, h| {
            e.qclass = convert::count(f, h)?;
            Ok(())
        })
        .field("qclass_name", |e, f, h| {
            e.qclass_name = convert::string(f, h);
            Ok(())
        })
        .field("qtype", |e, f, h| {
            e.qtype = convert::count(f, h)?;
            Ok(())
        })
        .field("qtype_name", |e, f, h| {
            e.qtype_name = convert::string(f, h);
            Ok(())
        })
        .field("rcode", |e, f, h| {
            e.rcode = convert::count(f, h)?;
            Ok(())
        })
        .field("rcode_name", |e, f, h| {
            e.rcode_name = convert::string(f, h);
            Ok(())
        })
        .field("AA", |e, f, h| {
            e.aa = convert::boolean(f, h)?;
            Ok(())
        })
        .field("TC", |e, f, h| {
            e.tc = convert::boolean(f, h)?;
            Ok(())
        })
        .field("RD", |e, f, h| {
            e.rd = convert::boolean(f, h)?;
            Ok(())
        })
        .field("RA", |e, f, h| {
            e.ra = convert::boolean(f, h)?;
            Ok(())
        })
        .field("Z", |e, f, h| {
            e.z = convert::count(f, h)?;
            Ok(())
        })
        .field("answers", |e, f, h| {
            e.answers = convert::string_set(f, h);
            Ok(())
        })
        .field("TTLs", |e, f, h| {
            e.ttls = convert::interval_set(f, h)?;
            Ok(())
        })
        .field("rejected", |e, f, h| {
            e.rejected = convert::boolean(f, h)?;
            Ok(())
        })
});

impl ZeekEntry for DnsEntry {
    const LOG_PATH: &'static str = "dns";

    fn field_table() -> &'static FieldTable<Self> {
        &DNS_FIELDS
    }
}

impl fmt::Display for DnsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} -> {:?}", self.ts, self.query, self.answers)
    }
}

/// 解析单个 dns.log
pub fn parse_dns_log<P: AsRef<Path>>(path: P) -> Result<Vec<DnsEntry>, ParseError> {
    super::parse_log(path)
}

/// 递归解析目录下所有 dns 日志
pub fn parse_dns_recurse<P: AsRef<Path>>(dir: P) -> Result<Vec<DnsEntry>, ParseError> {
    super::parse_recurse(dir)
}

/// 解析某一天的 dns 日志
pub fn dns_for_day(day: &str, config: &ParserConfig) -> Result<Vec<DnsEntry>, ParseError> {
    super::parse_for_day(day, config)
}
