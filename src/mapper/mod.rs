//! 类型映射模块 - 把 RawRecord 转换为强类型结构
//!
//! 每种日志（conn、dns、http、ssl、x509）用一张静态的字段表描述：
//! 字段名 -> 设置函数。[`map_record`] 遍历记录中的字段并查表分发，
//! 表中没有的字段记录日志后跳过。字段表可以脱离文件单独测试。

pub mod conn;
pub mod convert;
pub mod dns;
pub mod http;
pub mod ssl;
pub mod x509;

use crate::error::ParseError;
use crate::parser::{LogHeader, RawField, RawRecord, parse_log_file_with};
use crate::parser_config::ParserConfig;
use crate::walker::enumerate_files_with;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub use conn::{ConnEntry, ConnState};
pub use dns::DnsEntry;
pub use http::HttpEntry;
pub use ssl::SslEntry;
pub use x509::X509Entry;

/// 字段设置函数
pub type FieldSetter<T> =
    Box<dyn Fn(&mut T, &RawField, &LogHeader) -> Result<(), ParseError> + Send + Sync>;

/// 字段名到设置函数的映射表
pub struct FieldTable<T> {
    setters: HashMap<&'static str, FieldSetter<T>>,
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FieldTable<T> {
    pub fn new() -> Self {
        Self {
            setters: HashMap::new(),
        }
    }

    /// 注册一个字段
    pub fn field<F>(mut self, name: &'static str, setter: F) -> Self
    where
        F: Fn(&mut T, &RawField, &LogHeader) -> Result<(), ParseError> + Send + Sync + 'static,
    {
        self.setters.insert(name, Box::new(setter));
        self
    }

    /// 注册连接四元组字段（`id.orig_h`、`id.orig_p`、`id.resp_h`、`id.resp_p`）
    pub fn conn_id(self, id: fn(&mut T) -> &mut ConnId) -> Self
    where
        T: 'static,
    {
        self.field("id.orig_h", move |e, f, h| {
            id(e).orig_h = convert::string(f, h);
            Ok(())
        })
        .field("id.orig_p", move |e, f, h| {
            id(e).orig_p = convert::count(f, h)?;
            Ok(())
        })
        .field("id.resp_h", move |e, f, h| {
            id(e).resp_h = convert::string(f, h);
            Ok(())
        })
        .field("id.resp_p", move |e, f, h| {
            id(e).resp_p = convert::count(f, h)?;
            Ok(())
        })
    }

    /// 查找字段的设置函数
    pub fn get(&self, name: &str) -> Option<&FieldSetter<T>> {
        self.setters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.setters.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.setters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }

    /// 所有已知字段名（无序）
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.setters.keys().copied()
    }
}

/// 可以从某种 Zeek 日志映射得到的条目类型
pub trait ZeekEntry: Default + Send + Sized + 'static {
    /// 日志路径标签，同时用作目录遍历的文件名片段
    const LOG_PATH: &'static str;

    /// 该类型的字段表
    fn field_table() -> &'static FieldTable<Self>;
}

/// 连接四元组
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnId {
    /// 发起方地址
    pub orig_h: String,
    /// 发起方端口
    pub orig_p: i64,
    /// 响应方地址
    pub resp_h: String,
    /// 响应方端口
    pub resp_p: i64,
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.orig_h, self.orig_p, self.resp_h, self.resp_p
        )
    }
}

/// 传输层协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Proto {
    Tcp,
    Udp,
    Icmp,
    #[default]
    Unknown,
}

impl Proto {
    /// 解析 Zeek 的 `transport_proto` 值
    pub fn from_zeek(value: &str) -> Self {
        match value {
            "tcp" => Proto::Tcp,
            "udp" => Proto::Udp,
            "icmp" => Proto::Icmp,
            _ => Proto::Unknown,
        }
    }
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Proto::Tcp => "TCP",
            Proto::Udp => "UDP",
            Proto::Icmp => "ICMP",
            Proto::Unknown => "None",
        };
        f.write_str(name)
    }
}

/// 把一条 RawRecord 映射为强类型条目
///
/// # 错误
///
/// - `MissingSetSeparator` - 头部集合分隔符为空
/// - `InvalidValue` - 某个字段的值无法转换
///
/// 未知字段不会导致失败，只在 debug 级别记录。
pub fn map_record<T: ZeekEntry>(record: &RawRecord, header: &LogHeader) -> Result<T, ParseError> {
    if header.set_separator.is_empty() {
        return Err(ParseError::MissingSetSeparator);
    }

    let table = T::field_table();
    let mut entry = T::default();

    for field in record {
        match table.get(&field.name) {
            Some(setter) => setter(&mut entry, field, header)?,
            None => log::debug!(
                "{}",
                ParseError::UnknownField {
                    name: field.name.to_string()
                }
            ),
        }
    }
    Ok(entry)
}

/// 解析单个日志文件为强类型条目
pub fn parse_log<T: ZeekEntry, P: AsRef<Path>>(path: P) -> Result<Vec<T>, ParseError> {
    parse_log_with(path, &ParserConfig::default())
}

/// 使用指定配置解析单个日志文件为强类型条目
pub fn parse_log_with<T: ZeekEntry, P: AsRef<Path>>(
    path: P,
    config: &ParserConfig,
) -> Result<Vec<T>, ParseError> {
    let zeek_log = parse_log_file_with(path, config)?;
    zeek_log
        .records
        .iter()
        .map(|record| {
            map_record(record, &zeek_log.header).inspect_err(|err| log::error!("{}", err))
        })
        .collect()
}

/// 递归解析目录下所有该类型的日志
///
/// 任何一个文件失败即返回错误。
pub fn parse_recurse<T: ZeekEntry, P: AsRef<Path>>(dir: P) -> Result<Vec<T>, ParseError> {
    parse_recurse_with(dir, &ParserConfig::default())
}

/// 使用指定配置递归解析目录
pub fn parse_recurse_with<T: ZeekEntry, P: AsRef<Path>>(
    dir: P,
    config: &ParserConfig,
) -> Result<Vec<T>, ParseError> {
    let mut all = Vec::new();
    for path in enumerate_files_with(dir, T::LOG_PATH, config) {
        all.extend(parse_log_with::<T, _>(path?, config)?);
    }
    Ok(all)
}

/// 并行递归解析目录
///
/// 先完成目录遍历，再在 rayon 线程池上并行解析各个文件；结果按文件遍历顺序拼接。
pub fn parse_recurse_par<T: ZeekEntry, P: AsRef<Path>>(
    dir: P,
    config: &ParserConfig,
) -> Result<Vec<T>, ParseError> {
    let paths = enumerate_files_with(dir, T::LOG_PATH, config)
        .collect::<Result<Vec<PathBuf>, _>>()?;

    let per_file = paths
        .par_iter()
        .map(|path| parse_log_with::<T, _>(path, config))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(per_file.into_iter().flatten().collect())
}

/// 解析某一天（`YYYY-MM-DD`）的全部日志
///
/// 日志目录为 `config.zeek_dir/<day>/`。
pub fn parse_for_day<T: ZeekEntry>(day: &str, config: &ParserConfig) -> Result<Vec<T>, ParseError> {
    parse_recurse_with(config.day_dir(day), config)
}
