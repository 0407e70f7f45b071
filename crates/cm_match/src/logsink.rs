// crates/cm_match/src/logsink.rs

//! 日志汇聚
//!
//! 工作线程把日志记录发到共享通道，由单独的监听线程串行写入
//! 同一个输出，避免多线程写同一文件的交织。发送端克隆后分发给
//! 各工作线程；所有发送端释放后监听线程退出。

use crate::error::{MatchError, MatchResult};
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// 调试
    Debug,
    /// 常规
    Info,
    /// 警告（如跳过的要素）
    Warn,
    /// 错误
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

/// 一条日志记录
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// 产生时间 (UTC)
    pub timestamp: DateTime<Utc>,
    /// 级别
    pub severity: Severity,
    /// 来源上下文（线程名、任务编号等）
    pub context: String,
    /// 内容
    pub message: String,
}

impl LogRecord {
    /// 以当前时间创建记录
    pub fn new(severity: Severity, context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            context: context.into(),
            message: message.into(),
        }
    }
}

/// 日志发送端
///
/// 廉价克隆；监听端退出后发送变为空操作。
#[derive(Clone)]
pub struct LogChannel {
    tx: Sender<LogRecord>,
}

impl LogChannel {
    /// 发送一条记录
    ///
    /// 监听端已关闭时静默丢弃。
    pub fn send(&self, record: LogRecord) {
        let _ = self.tx.send(record);
    }

    /// 发送常规记录
    pub fn info(&self, context: impl Into<String>, message: impl Into<String>) {
        self.send(LogRecord::new(Severity::Info, context, message));
    }

    /// 发送警告记录
    pub fn warn(&self, context: impl Into<String>, message: impl Into<String>) {
        self.send(LogRecord::new(Severity::Warn, context, message));
    }

    /// 发送错误记录
    pub fn error(&self, context: impl Into<String>, message: impl Into<String>) {
        self.send(LogRecord::new(Severity::Error, context, message));
    }
}

/// 日志监听端
///
/// 持有串行写入线程的句柄。先释放所有 [`LogChannel`] 克隆，
/// 再调用 [`LogListener::stop`] 等待写入线程排空退出。
pub struct LogListener {
    handle: Option<JoinHandle<()>>,
}

impl LogListener {
    /// 启动监听线程
    ///
    /// 返回的 `LogChannel` 是初始发送端；所有克隆释放后线程
    /// 写完剩余记录并退出。
    ///
    /// # Errors
    /// 线程创建失败时返回 `MatchError::LogSink`
    pub fn start(mut sink: Box<dyn Write + Send>) -> MatchResult<(LogChannel, Self)> {
        let (tx, rx) = mpsc::channel::<LogRecord>();
        let handle = std::thread::Builder::new()
            .name("log-listener".into())
            .spawn(move || {
                while let Ok(record) = rx.recv() {
                    let _ = writeln!(
                        sink,
                        "{} [{}] {}: {}",
                        record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.severity,
                        record.context,
                        record.message
                    );
                }
                let _ = sink.flush();
            })
            .map_err(|e| MatchError::LogSink(e.to_string()))?;

        Ok((LogChannel { tx }, Self {
            handle: Some(handle),
        }))
    }

    /// 等待写入线程退出
    ///
    /// 调用前必须释放所有 `LogChannel` 克隆，否则阻塞。
    pub fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// 在目录下创建带时间戳的日志文件
///
/// 目录不存在时创建。返回缓冲写入器和文件路径。
///
/// # Errors
/// 目录或文件创建失败时返回 `MatchError::LogSink`
pub fn file_sink(dir: &Path) -> MatchResult<(Box<dyn Write + Send>, PathBuf)> {
    std::fs::create_dir_all(dir).map_err(|e| MatchError::LogSink(e.to_string()))?;
    let name = format!(
        "cartamatch-worker-{}.log",
        Utc::now().format("%Y%m%dT%H%M%S%.3f")
    );
    let path = dir.join(name);
    let file = std::fs::File::create(&path).map_err(|e| MatchError::LogSink(e.to_string()))?;
    Ok((Box::new(std::io::BufWriter::new(file)), path))
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// 线程间共享的内存写入器
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_records_from_many_senders_reach_one_sink() {
        let buffer = SharedBuffer::default();
        let (channel, listener) = LogListener::start(Box::new(buffer.clone())).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let ch = channel.clone();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        ch.info(format!("matcher-{i}"), format!("record {j}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        drop(channel);
        listener.stop();

        let text = String::from_utf8(buffer.0.lock().clone()).unwrap();
        assert_eq!(text.lines().count(), 40);
        assert!(text.contains("[INFO] matcher-0: record 0"));
        // 每行都是完整记录，无交织
        for line in text.lines() {
            assert!(line.contains("[INFO]"), "mangled line: {line}");
        }
    }

    #[test]
    fn test_send_after_stop_is_noop() {
        let buffer = SharedBuffer::default();
        let (channel, listener) = LogListener::start(Box::new(buffer.clone())).unwrap();
        let extra = channel.clone();
        drop(channel);
        listener.stop();
        // 不 panic，静默丢弃
        extra.warn("late", "dropped");
    }

    #[test]
    fn test_file_sink_creates_timestamped_file() {
        let dir = std::env::temp_dir().join("cm_match_logsink_test");
        let (mut sink, path) = file_sink(&dir).unwrap();
        writeln!(sink, "hello").unwrap();
        sink.flush().unwrap();
        drop(sink);

        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("cartamatch-worker-"));
        assert!(name.ends_with(".log"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }
}
