//! 错误类型定义
//!
//! 定义了 Zeek 日志解析过程中可能出现的所有错误类型。

use thiserror::Error;

/// 解析错误类型
///
/// 包含了从打开文件、解压、解析头部、切分记录到类型映射的全部错误情况。
/// I/O 错误以字符串形式携带，使得该类型可以 `Clone` 和比较。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// 文件无法打开（不存在、无权限等统一报告）
    #[error("open file error: {path}: {reason}")]
    FileOpen {
        /// 文件路径
        path: String,
        /// 操作系统给出的原因
        reason: String,
    },

    /// gzip 流损坏或无法解压
    #[error("decompression error: {0}")]
    Decompression(String),

    /// 文件不足 2 字节，无法判断压缩格式
    #[error("truncated stream: fewer than 2 bytes available")]
    TruncatedStream,

    /// 底层 I/O 错误
    #[error("io error: {0}")]
    Io(String),

    /// 头部中没有出现 `#separator` 行
    #[error("no #separator line found in header")]
    MissingSeparator,

    /// `#separator` 的值解码后为空
    #[error("empty field separator decoded from '{raw}'")]
    EmptySeparator {
        /// 原始的分隔符文本
        raw: String,
    },

    /// `#open` 字段的日期无法解析
    #[error("date not parsed for open field: '{value}'")]
    HeaderDateParse {
        /// 原始日期文本
        value: String,
    },

    /// `#fields` 与 `#types` 的数量不一致
    #[error("mismatched header fields: {fields} fields vs {types} types")]
    MismatchedHeaderFields {
        /// 字段名数量
        fields: usize,
        /// 类型数量
        types: usize,
    },

    /// `#fields` 中出现重复的字段名
    #[error("duplicate field name in header: '{name}'")]
    DuplicateHeaderField {
        /// 重复的字段名
        name: String,
    },

    /// 数据行的字段数与头部声明的不一致
    #[error("mismatch between line {line} in log and fields in header: expected {expected}, got {actual}")]
    FieldCountMismatch {
        /// 行号（从 1 开始，包含头部行）
        line: usize,
        /// 头部声明的字段数
        expected: usize,
        /// 实际切分出的字段数
        actual: usize,
    },

    /// 目录遍历失败
    #[error("failed to walk '{path}': {reason}")]
    Walk {
        /// 出错的路径
        path: String,
        /// 失败原因
        reason: String,
    },

    /// 头部没有集合分隔符，无法解析集合字段
    #[error("no set separator in header, can't parse")]
    MissingSetSeparator,

    /// 字段值无法转换为目标类型
    #[error("invalid value for field '{field}': '{value}' ({reason})")]
    InvalidValue {
        /// 字段名
        field: String,
        /// 原始值
        value: String,
        /// 失败原因
        reason: String,
    },

    /// 映射器不认识的字段（非致命，仅记录）
    #[error("unimplemented field: {name}")]
    UnknownField {
        /// 字段名
        name: String,
    },
}

impl ParseError {
    /// 是否为致命错误
    ///
    /// 除 `UnknownField` 外的所有错误都会终止当前文件的解析。
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ParseError::UnknownField { .. })
    }
}
