//! Parser 配置模块
//!
//! 集中管理读取缓冲、目录遍历和默认 Zeek 日志目录等可调参数，
//! 调用方在启动时显式构造并传入，库内部不持有任何全局配置。

use crate::parser::constants::DEFAULT_READ_BUFFER_CAPACITY;
use std::path::{Path, PathBuf};

/// Zeek 默认的日志归档目录
pub const DEFAULT_ZEEK_DIR: &str = "/usr/local/zeek/logs/";

/// 目录遍历遇到错误时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WalkPolicy {
    /// 产出一次错误后结束
    #[default]
    Strict,
    /// 吞掉错误，静默结束
    Lenient,
}

/// Parser 配置
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserConfig {
    /// Zeek 日志根目录，按天划分的子目录位于其下
    pub zeek_dir: PathBuf,

    /// 文件读取缓冲区大小（字节）
    pub read_buffer_capacity: usize,

    /// 目录遍历线程与消费者之间的通道容量
    pub walk_channel_capacity: usize,

    /// 目录遍历错误策略
    pub walk_policy: WalkPolicy,
}

impl ParserConfig {
    /// 使用指定的 Zeek 日志目录创建配置，其余取默认值
    pub fn with_zeek_dir<P: AsRef<Path>>(zeek_dir: P) -> Self {
        Self {
            zeek_dir: zeek_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// 返回某一天（`YYYY-MM-DD`）的日志目录
    pub fn day_dir(&self, day: &str) -> PathBuf {
        self.zeek_dir.join(day)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            zeek_dir: PathBuf::from(DEFAULT_ZEEK_DIR),
            read_buffer_capacity: DEFAULT_READ_BUFFER_CAPACITY,
            walk_channel_capacity: 64,
            walk_policy: WalkPolicy::Strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.zeek_dir, PathBuf::from("/usr/local/zeek/logs/"));
        assert_eq!(config.read_buffer_capacity, 256 * 1024);
        assert_eq!(config.walk_policy, WalkPolicy::Strict);
    }

    #[test]
    fn test_day_dir() {
        let config = ParserConfig::with_zeek_dir("/data/zeek");
        assert_eq!(
            config.day_dir("2020-06-15"),
            PathBuf::from("/data/zeek/2020-06-15")
        );
        assert_eq!(config.walk_channel_capacity, 64);
    }
}
