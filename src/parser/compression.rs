//! 压缩格式识别
//!
//! 通过文件开头的魔数判断流是否为 gzip 压缩。

use crate::error::ParseError;
use crate::parser::constants::GZIP_MAGIC;
use std::io::{self, Read, Seek, SeekFrom};

/// 流的压缩格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// 纯文本
    None,
    /// gzip 压缩
    Gzip,
}

/// 判断流是否为 gzip 压缩
///
/// 恰好读取 2 个字节并与 gzip 魔数比较。
///
/// **副作用**：流的位置会前进 2 个字节，调用方需要自行回到起点。
///
/// # 错误
///
/// - `TruncatedStream` - 可读字节不足 2 个（空文件或截断文件）
/// - `Io` - 其他底层读取错误
pub fn is_gzipped<R: Read>(reader: &mut R) -> Result<bool, ParseError> {
    let mut magic = [0u8; 2];
    reader.read_exact(&mut magic).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => ParseError::TruncatedStream,
        _ => ParseError::Io(e.to_string()),
    })?;
    Ok(magic == GZIP_MAGIC)
}

/// 识别可定位流的压缩格式，并把位置重置到开头
pub fn detect_compression<R: Read + Seek>(reader: &mut R) -> Result<Compression, ParseError> {
    let gzipped = is_gzipped(reader)?;
    reader
        .seek(SeekFrom::Start(0))
        .map_err(|e| ParseError::Io(e.to_string()))?;

    Ok(if gzipped {
        Compression::Gzip
    } else {
        Compression::None
    })
}
