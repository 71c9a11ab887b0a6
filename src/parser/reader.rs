//! LogReader - 单次遍历读取头部并流式切分记录
//!
//! 打开文件后先把头部行喂给 [`HeaderParser`]，遇到第一条数据行时头部结束，
//! 之后逐行切分为 [`RawRecord`]。body 中的 `#` 行（如 `#close`）会被跳过。

use crate::error::ParseError;
use crate::parser::header::{HeaderLine, HeaderParser, LogHeader};
use crate::parser::line_source::LineSource;
use crate::parser::record::RawRecord;
use crate::parser::tokenizer::Schema;
use crate::parser_config::ParserConfig;
use std::path::Path;

/// 从日志文件中逐条读取 [`RawRecord`] 的迭代器
///
/// 遇到第一个错误（字段数不匹配、读取失败）后产出该错误并结束，
/// 不会跳过坏行继续解析。
pub struct LogReader {
    header: LogHeader,
    schema: Schema,
    lines: LineSource,
    pending: Option<String>,
    finished: bool,
}

impl LogReader {
    /// 使用默认配置打开日志文件并解析头部
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        Self::open_with(path, &ParserConfig::default())
    }

    /// 打开日志文件并解析头部
    ///
    /// # 错误
    ///
    /// 打开、解压或头部解析过程中的任何错误。
    pub fn open_with<P: AsRef<Path>>(path: P, config: &ParserConfig) -> Result<Self, ParseError> {
        let mut lines = LineSource::open_with(path, config)?;
        let mut parser = HeaderParser::new();
        let mut pending = None;

        for line in lines.by_ref() {
            let line = line?;
            if parser.feed(&line)? == HeaderLine::Boundary {
                pending = Some(line);
                break;
            }
        }

        let header = parser.finish()?;
        let schema = Schema::from_header(&header);

        Ok(Self {
            header,
            schema,
            lines,
            pending,
            finished: false,
        })
    }

    /// 文件头部
    pub fn header(&self) -> &LogHeader {
        &self.header
    }

    /// 取出头部，消耗读取器
    pub fn into_header(self) -> LogHeader {
        self.header
    }

    /// 底层文件是否为 gzip 压缩
    pub fn is_compressed(&self) -> bool {
        self.lines.is_compressed()
    }

    /// 获取下一条数据行（跳过 `#` 行）
    fn next_data_line(&mut self) -> Result<Option<String>, ParseError> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }

        for line in self.lines.by_ref() {
            let line = line?;
            if !line.starts_with('#') {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }
}

impl Iterator for LogReader {
    type Item = Result<RawRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = match self.next_data_line() {
            Ok(Some(line)) => self.schema.tokenize(&line, self.lines.line_number()),
            Ok(None) => {
                self.finished = true;
                return None;
            }
            Err(e) => Err(e),
        };

        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}
