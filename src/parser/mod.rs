//! Parser 模块 - 解析 Zeek ASCII 日志
//!
//! 此模块提供了完整的通用日志解析功能,包括:
//! - 压缩格式识别和按行读取
//! - 自描述头部解析
//! - 数据行切分为 RawRecord
//! - 便捷 API 函数

mod api;
pub mod compression;
pub(crate) mod constants;
pub mod header;
pub mod line_source;
pub mod reader;
pub mod record;
pub mod tokenizer;

pub use api::{
    PartialLog, ZeekLog, iter_records_from_file, parse_files_par, parse_header,
    parse_header_with, parse_log_file, parse_log_file_partial, parse_log_file_with,
};
pub use compression::{Compression, detect_compression, is_gzipped};
pub use header::{HeaderLine, HeaderParser, LogHeader, unescape_field_value};
pub use line_source::LineSource;
pub use reader::LogReader;
pub use record::{RawField, RawRecord};
pub use tokenizer::{Schema, tokenize_line};
