//! 目录遍历模块
//!
//! 在后台线程中递归遍历目录，把文件名匹配的路径通过有界通道交给调用方。
//! 调用方以迭代器方式逐个拉取，遍历结束后迭代器终止，不可重启。
//!
//! # 示例
//!
//! ```no_run
//! use zeek_log_parser::walker::enumerate_files;
//!
//! for path in enumerate_files("/usr/local/zeek/logs/2020-06-15", "dns") {
//!     println!("{}", path?.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::ParseError;
use crate::parser_config::{ParserConfig, WalkPolicy};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, sync_channel};
use std::thread::{self, JoinHandle};
use walkdir::{DirEntry, WalkDir};

/// 判断路径是否匹配文件名片段
///
/// 要求片段后紧跟一个 `.`，避免 `dns` 匹配到 `dnsx.log`。
pub fn matches_fragment(path: &Path, fragment: &str) -> bool {
    let needle = format!("{}.", fragment);
    path.to_string_lossy().contains(&needle)
}

/// 普通文件，或指向普通文件的符号链接
fn is_log_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

/// 惰性产出匹配文件路径的迭代器
///
/// 默认严格模式：遍历出错时产出一次 `Walk` 错误随即结束。
/// drop 时会停止并回收遍历线程。
pub struct FileEnumerator {
    receiver: Option<Receiver<Result<PathBuf, ParseError>>>,
    worker: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    policy: WalkPolicy,
    finished: bool,
}

impl FileEnumerator {
    /// 切换为宽松模式：遍历错误被吞掉，迭代静默结束
    pub fn lenient(mut self) -> Self {
        self.policy = WalkPolicy::Lenient;
        self
    }

    /// 当前的错误策略
    pub fn policy(&self) -> WalkPolicy {
        self.policy
    }

    fn finish(&mut self) {
        self.finished = true;
        // 遍历线程在每个目录项前检查停止标志
        self.stop.store(true, Ordering::Relaxed);
        // 断开通道，阻塞在 send 上的遍历线程才能退出
        self.receiver = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("directory walker thread panicked");
            }
        }
    }
}

impl Iterator for FileEnumerator {
    type Item = Result<PathBuf, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let received = self.receiver.as_ref().and_then(|rx| rx.recv().ok());
        match received {
            Some(Ok(path)) => Some(Ok(path)),
            Some(Err(err)) => {
                self.finish();
                match self.policy {
                    WalkPolicy::Strict => Some(Err(err)),
                    WalkPolicy::Lenient => {
                        log::debug!("walk stopped: {}", err);
                        None
                    }
                }
            }
            None => {
                self.finish();
                None
            }
        }
    }
}

impl Drop for FileEnumerator {
    fn drop(&mut self) {
        self.finish();
    }
}

/// 递归遍历目录，产出路径中包含 `fragment.` 的文件
pub fn enumerate_files<P: AsRef<Path>>(root: P, fragment: &str) -> FileEnumerator {
    enumerate_files_with(root, fragment, &ParserConfig::default())
}

/// 使用指定配置遍历目录
pub fn enumerate_files_with<P: AsRef<Path>>(
    root: P,
    fragment: &str,
    config: &ParserConfig,
) -> FileEnumerator {
    let root = root.as_ref().to_path_buf();
    let fragment = fragment.to_string();
    let (tx, rx) = sync_channel(config.walk_channel_capacity);
    let stop = Arc::new(AtomicBool::new(false));
    let worker_stop = Arc::clone(&stop);

    let worker = thread::spawn(move || {
        log::debug!("walking {} for '{}.'", root.display(), fragment);
        for entry in WalkDir::new(&root).sort_by_file_name() {
            if worker_stop.load(Ordering::Relaxed) {
                log::debug!("walk of {} cancelled", root.display());
                break;
            }
            let message = match entry {
                Ok(entry) => {
                    if !is_log_file(&entry) || !matches_fragment(entry.path(), &fragment) {
                        continue;
                    }
                    Ok(entry.into_path())
                }
                Err(err) => Err(ParseError::Walk {
                    path: err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string()),
                    reason: err.to_string(),
                }),
            };

            let is_err = message.is_err();
            // 消费者已经放弃时 send 失败，直接退出
            if tx.send(message).is_err() || is_err {
                break;
            }
        }
    });

    FileEnumerator {
        receiver: Some(rx),
        worker: Some(worker),
        stop,
        policy: config.walk_policy,
        finished: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    #[test]
    fn fragment_requires_trailing_dot() {
        assert!(matches_fragment(Path::new("/logs/dns.log"), "dns"));
        assert!(matches_fragment(
            Path::new("/logs/2020-06-15/dns.00:00:00-01:00:00.log.gz"),
            "dns"
        ));
        assert!(!matches_fragment(Path::new("/logs/dnsx.log"), "dns"));
        assert!(!matches_fragment(Path::new("/logs/http.log"), "dns"));
    }

    #[test]
    fn enumerates_nested_matches() {
        let dir = TempDir::new().unwrap();
        let day = dir.path().join("2020-06-15");
        fs::create_dir(&day).unwrap();
        for name in ["dns.log", "conn.log"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::write(day.join("dns.00:00:00-01:00:00.log.gz"), "x").unwrap();

        let found: Vec<PathBuf> = enumerate_files(dir.path(), "dns")
            .map(Result::unwrap)
            .collect();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| matches_fragment(p, "dns")));
    }

    #[test]
    fn directories_are_not_yielded() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("dns.d")).unwrap();
        assert_eq!(enumerate_files(dir.path(), "dns").count(), 0);
    }

    #[test]
    fn missing_root_is_an_error_in_strict_mode() {
        let mut files = enumerate_files("/nonexistent/zeek/logs", "dns");
        assert!(matches!(files.next(), Some(Err(ParseError::Walk { .. }))));
        assert!(files.next().is_none());
    }

    #[test]
    fn missing_root_is_empty_in_lenient_mode() {
        let files = enumerate_files("/nonexistent/zeek/logs", "dns").lenient();
        assert_eq!(files.policy(), WalkPolicy::Lenient);
        assert_eq!(files.count(), 0);
    }

    #[test]
    fn dropping_early_stops_the_walker() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a_dns.log"), "x").unwrap();
        for d in 0..40 {
            let sub = dir.path().join(format!("d{d:02}"));
            fs::create_dir(&sub).unwrap();
            for i in 0..500 {
                fs::write(sub.join(format!("x{i}.log")), "x").unwrap();
            }
        }

        // 没有匹配项时遍历整棵树的耗时
        let started = Instant::now();
        assert_eq!(enumerate_files(dir.path(), "nomatch").count(), 0);
        let full_walk = started.elapsed();

        let config = ParserConfig {
            walk_channel_capacity: 1,
            ..ParserConfig::default()
        };
        let mut files = enumerate_files_with(dir.path(), "dns", &config);
        assert!(files.next().unwrap().unwrap().ends_with("a_dns.log"));

        let started = Instant::now();
        drop(files);
        let dropped = started.elapsed();

        assert!(
            dropped * 4 < full_walk,
            "drop took {:?}, full walk {:?}",
            dropped,
            full_walk
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_log_files_are_yielded() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("archive.bin");
        fs::write(&target, "x").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("dns.log")).unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("dns.d")).unwrap();

        let found: Vec<PathBuf> = enumerate_files(dir.path(), "dns")
            .map(Result::unwrap)
            .collect();
        assert_eq!(found, vec![dir.path().join("dns.log")]);
    }

}
