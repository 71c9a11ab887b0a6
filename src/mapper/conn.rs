//! conn.log 映射

use super::{ConnId, FieldTable, Proto, ZeekEntry, convert};
use crate::error::ParseError;
use crate::parser_config::ParserConfig;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::fmt;
use std::path::Path;

/// 连接状态码及其含义
const CONN_STATES: &[(&str, &str)] = &[
    ("S0", "Connection attempt seen, no reply."),
    ("S1", "Connection established, not terminated."),
    ("SF", "Normal establishment and termination."),
    ("REJ", "Connection attempt rejected."),
    (
        "S2",
        "Connection established and close attempt by originator seen (but no reply from responder).",
    ),
    (
        "S3",
        "Connection established and close attempt by responder seen (but no reply from originator).",
    ),
    ("RSTO", "Connection established, originator aborted (sent a RST)."),
    ("RSTR", "Responder sent a RST."),
    (
        "RSTOS0",
        "Originator sent a SYN followed by a RST, we never saw a SYN-ACK from the responder.",
    ),
    (
        "RSTRH",
        "Responder sent a SYN ACK followed by a RST, we never saw a SYN from the (purported) originator.",
    ),
    (
        "SH",
        "Originator sent a SYN followed by a FIN, we never saw a SYN ACK from the responder (hence the connection was \"half\" open).",
    ),
    (
        "SHR",
        "Responder sent a SYN ACK followed by a FIN, we never saw a SYN from the originator.",
    ),
    (
        "OTH",
        "No SYN seen, just midstream traffic (a \"partial connection\" that was not later closed).",
    ),
];

/// 未知状态码的说明
pub const UNKNOWN_CONN_STATE: &str = "ERR: unknown code";

/// 连接状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnState {
    /// 状态码，已知状态码统一为大写
    pub code: String,
    /// 状态说明
    pub summary: String,
}

impl ConnState {
    /// 按状态码查表，不区分大小写
    ///
    /// 未知状态码保留原样，说明为 [`UNKNOWN_CONN_STATE`]。
    pub fn from_code(code: &str) -> Self {
        let upper = code.to_ascii_uppercase();
        match CONN_STATES.iter().find(|(known, _)| *known == upper) {
            Some((known, summary)) => Self {
                code: (*known).to_string(),
                summary: (*summary).to_string(),
            },
            None => Self {
                code: code.to_string(),
                summary: UNKNOWN_CONN_STATE.to_string(),
            },
        }
    }

    pub fn is_known(&self) -> bool {
        self.summary != UNKNOWN_CONN_STATE && !self.code.is_empty()
    }
}

impl fmt::Display for ConnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.summary)
    }
}

/// conn.log 中的一条连接
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnEntry {
    pub ts: DateTime<Utc>,
    pub uid: String,
    pub id: ConnId,
    pub proto: Proto,
    /// 识别出的应用层协议
    pub service: String,
    /// 持续时间（秒），未设置为 -1
    pub duration: f64,
    pub orig_bytes: i64,
    pub resp_bytes: i64,
    pub conn_state: ConnState,
    /// `Site::local_nets` 未配置时为 `None`
    pub local_orig: Option<bool>,
    pub local_resp: Option<bool>,
    pub missed_bytes: i64,
    /// 状态历史
    pub history: String,
    pub orig_pkts: i64,
    pub orig_ip_bytes: i64,
    pub resp_pkts: i64,
    pub resp_ip_bytes: i64,
    /// 外层隧道连接的 uid
    pub tunnel_parents: Vec<String>,
}

static CONN_FIELDS: Lazy<FieldTable<ConnEntry>> = Lazy::new(|| {
    FieldTable::new()
        .field("ts", |e: &mut ConnEntry, f, h| {
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
        .field("service", |e, f, h| {
            e.service = convert::string(f, h);
            Ok(())
        })
        .field("duration", |e, f, h| {
            e.duration = convert::interval(f, h)?;
            Ok(())
        })
        .field("orig_bytes", |e, f, h| {
            e.orig_bytes = convert::count(f, h)?;
            Ok(())
        })
        .field("resp_bytes", |e, f, h| {
            e.resp_bytes = convert::count(f, h)?;
            Ok(())
        })
        .field("conn_state", |e, f, h| {
            if !h.is_unset(&f.raw_value) {
                e.conn_state = ConnState::from_code(&f.raw_value);
            }
            Ok(())
        })
        .field("local_orig", |e, f, h| {
            e.local_orig = convert::opt_boolean(f, h)?;
            Ok(())
        })
        .field("local_resp", |e, f, h| {
            e.local_resp = convert::opt_boolean(f, h)?;
            Ok(())
        })
        .field("missed_bytes", |e, f, h| {
            e.missed_bytes = convert::count(f, h)?;
            Ok(())
        })
        .field("history", |e, f, h| {
            e.history = convert::string(f, h);
            Ok(())
        })
        .field("orig_pkts", |e, f, h| {
            e.orig_pkts = convert::count(f, h)?;
            Ok(())
        })
        .field("orig_ip_bytes", |e, f, h| {
            e.orig_ip_bytes = convert::count(f, h)?;
            Ok(())
        })
        .field("resp_pkts", |e, f, h| {
            e.resp_pkts = convert::count(f, h)?;
            Ok(())
        })
        .field("resp_ip_bytes", |e, f, h| {
            e.resp_ip_bytes = convert::count(f, h)?;
            Ok(())
        })
        .field("tunnel_parents", |e, f, h| {
            e.tunnel_parents = convert::string_set(f, h);
            Ok(())
        })
});

impl ZeekEntry for ConnEntry {
    const LOG_PATH: &'static str = "conn";

    fn field_table() -> &'static FieldTable<Self> {
        &CONN_FIELDS
    }
}

impl fmt::Display for ConnEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {} {}",
            self.ts, self.proto, self.id, self.service, self.conn_state.code
        )
    }
}

/// 解析单个 conn.log
pub fn parse_conn_log<P: AsRef<Path>>(path: P) -> Result<Vec<ConnEntry>, ParseError> {
    super::parse_log(path)
}

/// 递归解析目录下所有 conn 日志
pub fn parse_conn_recurse<P: AsRef<Path>>(dir: P) -> Result<Vec<ConnEntry>, ParseError> {
    super::parse_recurse(dir)
}

/// 解析某一天的 conn 日志
pub fn conn_for_day(day: &str, config: &ParserConfig) -> Result<Vec<ConnEntry>, ParseError> {
    super::parse_for_day(day, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::map_record;
    use crate::parser::{LogHeader, RawField, RawRecord};

    #[test]
    fn conn_state_lookup() {
        let s0 = ConnState::from_code("S0");
        assert_eq!(s0.code, "S0");
        assert_eq!(s0.summary, "Connection attempt seen, no reply.");

        let lower = ConnState::from_code("s0");
        assert_eq!(lower, s0);

        let junk = ConnState::from_code("s0asdfas");
        assert_eq!(junk.code, "s0asdfas");
        assert_eq!(junk.summary, UNKNOWN_CONN_STATE);
        assert!(!junk.is_known());
        assert!(s0.is_known());
    }

    #[test]
    fn maps_conn_record() {
        let record = RawRecord::new(vec![
            RawField::new("ts", "time", "1592266854.705260"),
            RawField::new("uid", "string", "CHhAvVGS1DHFjwGM9"),
            RawField::new("id.orig_h", "addr", "10.0.0.5"),
            RawField::new("id.orig_p", "port", "49152"),
            RawField::new("id.resp_h", "addr", "93.184.216.34"),
            RawField::new("id.resp_p", "port", "443"),
            RawField::new("proto", "enum", "tcp"),
            RawField::new("service", "string", "ssl"),
            RawField::new("duration", "interval", "1.250000"),
            RawField::new("orig_bytes", "count", "517"),
            RawField::new("resp_bytes", "count", "-"),
            RawField::new("conn_state", "string", "SF"),
            RawField::new("local_orig", "bool", "-"),
            RawField::new("local_resp", "bool", "F"),
            RawField::new("history", "string", "ShADadFf"),
            RawField::new("tunnel_parents", "set[string]", "(empty)"),
        ]);

        let conn: ConnEntry = map_record(&record, &LogHeader::default()).unwrap();
        assert_eq!(conn.proto, Proto::Tcp);
        assert_eq!(conn.id.resp_p, 443);
        assert_eq!(conn.duration, 1.25);
        assert_eq!(conn.orig_bytes, 517);
        assert_eq!(conn.resp_bytes, -1);
        assert_eq!(conn.conn_state.code, "SF");
        assert_eq!(conn.local_orig, None);
        assert_eq!(conn.local_resp, Some(false));
        assert!(conn.tunnel_parents.is_empty());
        assert!(conn.to_string().contains("10.0.0.5:49152 -> 93.184.216.34:443"));
    }

    #[test]
    fn unset_conn_state_stays_empty() {
        let record = RawRecord::new(vec![RawField::new("conn_state", "string", "-")]);
        let conn: ConnEntry = map_record(&record, &LogHeader::default()).unwrap();
        assert_eq!(conn.conn_state, ConnState::default());
    }
}
