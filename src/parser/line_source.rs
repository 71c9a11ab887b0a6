//! LineSource - 按行读取纯文本或 gzip 压缩的日志文件
//!
//! 调用方无需关心文件是否压缩：打开时识别魔数，必要时套上 gzip 解码器，
//! 之后统一按行迭代。文件句柄和解码器都归 `LineSource` 所有，随其 drop 释放。

use crate::error::ParseError;
use crate::parser::compression::{Compression, detect_compression};
use crate::parser_config::ParserConfig;
use flate2::bufread::MultiGzDecoder;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

/// 逐行读取日志文件的迭代器
///
/// 每次迭代返回去掉行尾 `\n`（以及 `\r`）的一行。遇到读取错误后迭代结束。
pub struct LineSource {
    reader: Box<dyn BufRead + Send>,
    buffer: Vec<u8>,
    compression: Compression,
    line_number: usize,
    finished: bool,
}

impl LineSource {
    /// 使用默认配置打开文件
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        Self::open_with(path, &ParserConfig::default())
    }

    /// 打开文件并识别压缩格式
    ///
    /// # 错误
    ///
    /// - `FileOpen` - 任何打开失败（不区分文件不存在或无权限）
    /// - `TruncatedStream` - 文件不足 2 字节
    /// - `Decompression` - gzip 头部无效
    pub fn open_with<P: AsRef<Path>>(path: P, config: &ParserConfig) -> Result<Self, ParseError> {
        let path_ref = path.as_ref();
        let mut file = File::open(path_ref).map_err(|e| ParseError::FileOpen {
            path: path_ref.display().to_string(),
            reason: e.to_string(),
        })?;

        let compression = detect_compression(&mut file)?;
        let capacity = config.read_buffer_capacity.max(1);

        let reader: Box<dyn BufRead + Send> = match compression {
            Compression::Gzip => {
                let decoder = MultiGzDecoder::new(BufReader::with_capacity(capacity, file));
                let mut reader = BufReader::with_capacity(capacity, decoder);
                // 提前触发 gzip 头部解析，坏流在打开时就报告
                reader
                    .fill_buf()
                    .map_err(|e| ParseError::Decompression(e.to_string()))?;
                Box::new(reader)
            }
            Compression::None => Box::new(BufReader::with_capacity(capacity, file)),
        };

        log::debug!(
            "opened {} ({:?} compression)",
            path_ref.display(),
            compression
        );

        Ok(Self {
            reader,
            buffer: Vec::with_capacity(4096),
            compression,
            line_number: 0,
            finished: false,
        })
    }

    /// 底层文件是否为 gzip 压缩
    pub fn is_compressed(&self) -> bool {
        self.compression == Compression::Gzip
    }

    /// 最近一次返回的行号（从 1 开始，尚未读取时为 0）
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// 读取下一行
    fn read_line(&mut self) -> Result<Option<String>, ParseError> {
        self.buffer.clear();
        let compression = self.compression;
        let bytes_read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .map_err(|e| read_error(compression, e))?;

        if bytes_read == 0 {
            return Ok(None);
        }

        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
        }
        if self.buffer.last() == Some(&b'\r') {
            self.buffer.pop();
        }

        self.line_number += 1;
        // 缓冲区留在 self 中供下一行复用
        Ok(Some(String::from_utf8_lossy(&self.buffer).into_owned()))
    }
}

fn read_error(compression: Compression, e: io::Error) -> ParseError {
    match compression {
        Compression::Gzip => ParseError::Decompression(e.to_string()),
        Compression::None => ParseError::Io(e.to_string()),
    }
}

impl Iterator for LineSource {
    type Item = Result<String, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression as GzLevel, write::GzEncoder};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn plain_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    fn gzip_file(content: &[u8]) -> NamedTempFile {
        let mut encoder = GzEncoder::new(Vec::new(), GzLevel::default());
        encoder.write_all(content).unwrap();
        plain_file(&encoder.finish().unwrap())
    }

    #[test]
    fn reads_plain_lines_without_newlines() {
        let file = plain_file(b"#separator \\x09\nline one\r\nline two");
        let mut source = LineSource::open(file.path()).unwrap();
        assert!(!source.is_compressed());

        let lines: Vec<String> = source.by_ref().map(Result::unwrap).collect();
        assert_eq!(lines, vec!["#separator \\x09", "line one", "line two"]);
        assert_eq!(source.line_number(), 3);
    }

    #[test]
    fn reads_gzip_lines() {
        let file = gzip_file(b"a\tb\nc\td\n");
        let source = LineSource::open(file.path()).unwrap();
        assert!(source.is_compressed());

        let lines: Vec<String> = source.map(Result::unwrap).collect();
        assert_eq!(lines, vec!["a\tb", "c\td"]);
    }

    #[test]
    fn missing_file_is_file_open_error() {
        let result = LineSource::open("/nonexistent/dndsfs.log");
        assert!(matches!(result, Err(ParseError::FileOpen { .. })));
    }

    #[test]
    fn empty_file_is_truncated() {
        let file = plain_file(b"");
        assert!(matches!(
            LineSource::open(file.path()),
            Err(ParseError::TruncatedStream)
        ));
    }

    #[test]
    fn bad_gzip_header_is_decompression_error() {
        // 合法的 gzip 头部，后跟保留块类型的 deflate 数据
        let file = plain_file(&[
            0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff,
        ]);
        assert!(matches!(
            LineSource::open(file.path()),
            Err(ParseError::Decompression(_))
        ));
    }

    #[test]
    fn line_buffer_is_reused() {
        let long_line = "x".repeat(10_000);
        let file = plain_file(format!("{}\nshort\n", long_line).as_bytes());
        let mut source = LineSource::open(file.path()).unwrap();

        assert_eq!(source.next().unwrap().unwrap(), long_line);
        assert_eq!(source.next().unwrap().unwrap(), "short");
        assert!(source.buffer.capacity() >= 10_000);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let file = plain_file(b"ok\n\xff\xfe\n");
        let lines: Vec<String> = LineSource::open(file.path())
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(lines[0], "ok");
        assert!(lines[1].contains('\u{fffd}'));
    }
}
