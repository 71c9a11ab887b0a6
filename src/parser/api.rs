//! 便捷 API 函数
//!
//! 提供了一组方便使用的高层 API，用于快速解析 Zeek 日志文件。

use crate::error::ParseError;
use crate::parser::header::{HeaderLine, HeaderParser, LogHeader};
use crate::parser::line_source::LineSource;
use crate::parser::reader::LogReader;
use crate::parser::record::RawRecord;
use crate::parser_config::ParserConfig;
use rayon::prelude::*;
use std::path::Path;

/// 一个完整解析的日志文件
#[derive(Debug, Clone, PartialEq)]
pub struct ZeekLog {
    /// 文件头部
    pub header: LogHeader,

    /// 所有数据行
    pub records: Vec<RawRecord>,
}

/// 解析中途失败时已经收集到的结果
///
/// 头部解析失败时 `header` 为 `None` 且没有任何记录。
#[derive(Debug, Clone, PartialEq)]
pub struct PartialLog {
    pub header: Option<LogHeader>,
    pub records: Vec<RawRecord>,
    pub error: Option<ParseError>,
}

impl PartialLog {
    /// 转换为严格结果：有错误即返回错误
    pub fn into_result(self) -> Result<ZeekLog, ParseError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        match self.header {
            Some(header) => Ok(ZeekLog {
                header,
                records: self.records,
            }),
            None => Err(ParseError::MissingSeparator),
        }
    }
}

/// 只解析文件头部
///
/// 只读取头部占用的行，遇到第一条数据行即停止。
///
/// # 示例
///
/// ```no_run
/// use zeek_log_parser::parse_header;
///
/// let header = parse_header("/usr/local/zeek/logs/current/dns.log")?;
/// println!("path={} fields={:?}", header.path, header.field_order);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_header<P: AsRef<Path>>(path: P) -> Result<LogHeader, ParseError> {
    parse_header_with(path, &ParserConfig::default())
}

/// 使用指定配置解析文件头部
pub fn parse_header_with<P: AsRef<Path>>(
    path: P,
    config: &ParserConfig,
) -> Result<LogHeader, ParseError> {
    let mut parser = HeaderParser::new();
    for line in LineSource::open_with(path, config)? {
        if parser.feed(&line?)? == HeaderLine::Boundary {
            break;
        }
    }
    parser.finish()
}

/// 从文件读取并返回 RawRecord 迭代器（流式处理）
///
/// 头部在此函数返回前已经解析完成，可以通过 [`LogReader::header`] 访问。
///
/// # 示例
///
/// ```no_run
/// use zeek_log_parser::iter_records_from_file;
///
/// let reader = iter_records_from_file("conn.log.gz")?;
/// println!("fields: {:?}", reader.header().field_order);
///
/// for record in reader {
///     let record = record?;
///     println!("uid={:?}", record.value("uid"));
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn iter_records_from_file<P: AsRef<Path>>(path: P) -> Result<LogReader, ParseError> {
    LogReader::open(path)
}

/// 解析整个日志文件
///
/// 文件按行扫描，结果全部加载到内存。任何错误都会终止解析。
///
/// # 示例
///
/// ```no_run
/// use zeek_log_parser::parse_log_file;
///
/// let log = parse_log_file("dns.log")?;
/// println!("{} 条记录，{} 个字段", log.records.len(), log.header.field_count());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_log_file<P: AsRef<Path>>(path: P) -> Result<ZeekLog, ParseError> {
    parse_log_file_with(path, &ParserConfig::default())
}

/// 使用指定配置解析整个日志文件
pub fn parse_log_file_with<P: AsRef<Path>>(
    path: P,
    config: &ParserConfig,
) -> Result<ZeekLog, ParseError> {
    let mut reader = LogReader::open_with(path, config)?;
    let records = reader.by_ref().collect::<Result<Vec<_>, _>>()?;
    Ok(ZeekLog {
        header: reader.into_header(),
        records,
    })
}

/// 解析整个日志文件，出错时保留已经收集到的记录
pub fn parse_log_file_partial<P: AsRef<Path>>(path: P) -> PartialLog {
    let mut reader = match LogReader::open(path) {
        Ok(reader) => reader,
        Err(err) => {
            return PartialLog {
                header: None,
                records: Vec::new(),
                error: Some(err),
            };
        }
    };

    let mut records = Vec::new();
    let mut error = None;
    for result in reader.by_ref() {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                error = Some(err);
                break;
            }
        }
    }

    PartialLog {
        header: Some(reader.into_header()),
        records,
        error,
    }
}

/// 并行解析多个文件
///
/// 每个文件的解析互相独立，在 rayon 全局线程池上执行；结果顺序与输入一致。
pub fn parse_files_par<P>(paths: &[P]) -> Vec<Result<ZeekLog, ParseError>>
where
    P: AsRef<Path> + Sync,
{
    paths.par_iter().map(|path| parse_log_file(path)).collect()
}
