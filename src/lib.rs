//! # Zeek Log Parser
//!
//! Zeek/Bro 网络监控日志解析器：读取自描述的 ASCII 日志（明文或 gzip），
//! 把每一行转换为按头部字段排列的 RawRecord，并可进一步映射为强类型条目。
//!
//! ## 功能特性
//!
//! - **自动识别压缩**: 通过魔数识别 gzip，对调用方透明
//! - **自描述头部**: 解析 `#separator`、`#fields`、`#types` 等元数据，支持 `\x09` 转义
//! - **流式读取**: 头部解析后按行产出记录，不需要整个文件驻留内存
//! - **强类型映射**: conn、dns、http、ssl、x509 五种日志的字段表
//! - **目录遍历**: 后台线程递归查找匹配的日志文件
//!
//! ## 快速开始
//!
//! ### 解析单个文件
//!
//! ```rust,no_run
//! use zeek_log_parser::parse_log_file;
//!
//! let log = parse_log_file("/usr/local/zeek/logs/current/dns.log")?;
//! for record in &log.records {
//!     println!("{:?} -> {:?}", record.value("query"), record.value("answers"));
//! }
//! # Ok::<(), zeek_log_parser::ParseError>(())
//! ```
//!
//! ### 流式处理
//!
//! ```rust,no_run
//! use zeek_log_parser::iter_records_from_file;
//!
//! let reader = iter_records_from_file("conn.00:00:00-01:00:00.log.gz")?;
//! for record in reader {
//!     let record = record?;
//!     println!("uid={:?}", record.value("uid"));
//! }
//! # Ok::<(), zeek_log_parser::ParseError>(())
//! ```
//!
//! ### 强类型条目
//!
//! ```rust,no_run
//! use zeek_log_parser::{ParserConfig, mapper::dns::dns_for_day};
//!
//! let config = ParserConfig::default();
//! for entry in dns_for_day("2020-06-15", &config)? {
//!     if !entry.is_rdns_lookup() {
//!         println!("{}", entry);
//!     }
//! }
//! # Ok::<(), zeek_log_parser::ParseError>(())
//! ```
//!
//! ## 日志格式
//!
//! ```text
//! #separator \x09
//! #set_separator	,
//! #empty_field	(empty)
//! #unset_field	-
//! #path	dns
//! #open	2020-06-15-10-00-00
//! #fields	ts	uid	query
//! #types	time	string	string
//! 1592266854.705260	CHhAvVGS1DHFjwGM9	www.example.com
//! #close	2020-06-15-11-00-00
//! ```

pub mod error;
pub mod mapper;
pub mod parser;
pub mod parser_config;
pub mod tools;
pub mod walker;

pub use error::ParseError;
pub use mapper::{
    ConnEntry, ConnId, ConnState, DnsEntry, FieldTable, HttpEntry, Proto, SslEntry, X509Entry,
    ZeekEntry, map_record, parse_for_day, parse_log, parse_recurse, parse_recurse_par,
};
pub use parser::{
    LogHeader, LogReader, PartialLog, RawField, RawRecord, ZeekLog, iter_records_from_file,
    parse_files_par, parse_header, parse_log_file, parse_log_file_partial,
};
pub use parser_config::{ParserConfig, WalkPolicy};
pub use walker::{FileEnumerator, enumerate_files};
