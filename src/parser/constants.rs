//! 解析器使用的常量定义
//!
//! 定义了压缩识别、头部解析和默认取值相关的常量。

// 压缩识别

/// gzip 流的魔数（前两个字节）
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// 头部标签

/// 所有头部行的前缀
pub const HEADER_PREFIX: char = '#';

/// 分隔符行前缀（分隔符行本身总是以空格分隔）
pub const SEPARATOR_LINE_PREFIX: &str = "#separator";

/// 分隔符标签
pub const TAG_SEPARATOR: &str = "separator";

/// 集合分隔符标签
pub const TAG_SET_SEPARATOR: &str = "set_separator";

/// 未设置字段标记标签
pub const TAG_UNSET_FIELD: &str = "unset_field";

/// 空集合标记标签
pub const TAG_EMPTY_FIELD: &str = "empty_field";

/// 日志路径标签
pub const TAG_PATH: &str = "path";

/// 打开时间标签
pub const TAG_OPEN: &str = "open";

/// 字段名标签
pub const TAG_FIELDS: &str = "fields";

/// 字段类型标签
pub const TAG_TYPES: &str = "types";

/// 十六进制转义前缀（字面量 `\x`）
pub const HEX_ESCAPE_PREFIX: &str = "\\x";

/// `#open` 字段的时间格式（YYYY-MM-DD-HH-MM-SS）
pub const ZEEK_DATETIME_FMT: &str = "%Y-%m-%d-%H-%M-%S";

// 默认值

/// 默认字段分隔符（头部中写作 `\x09`）
pub const DEFAULT_SEPARATOR: &str = "\t";

/// 默认集合分隔符
pub const DEFAULT_SET_SEPARATOR: &str = ",";

/// 默认空集合标记
pub const DEFAULT_EMPTY_FIELD: &str = "(empty)";

/// 默认未设置标记
pub const DEFAULT_UNSET_FIELD: &str = "-";

/// 默认读缓冲区大小
pub const DEFAULT_READ_BUFFER_CAPACITY: usize = 256 * 1024;
