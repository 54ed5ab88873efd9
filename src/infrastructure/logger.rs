//! 日志基础设施

use anyhow::Result;
use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

pub struct Logger;

impl Logger {
    /// 初始化日志系统
    ///
    /// `RUST_LOG` 优先于配置中的级别。配置了 `log_dir` 时额外写入按日期分割的日志文件，
    /// 返回的 guard 需要一直持有到进程退出，否则缓冲中的日志会丢失。
    pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))?;

        match &config.log_dir {
            Some(log_dir) => {
                std::fs::create_dir_all(log_dir)?;

                let file_appender = rolling::daily(log_dir, &config.file_prefix);
                let (writer, guard) = non_blocking(file_appender);

                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        fmt::layer()
                            .with_writer(writer)
                            .with_ansi(false) // 文件中不使用颜色
                            .with_target(false)
                            .with_thread_names(true),
                    )
                    .with(fmt::layer().with_writer(io::stdout).with_ansi(true))
                    .try_init()?;

                Ok(Some(guard))
            }
            None => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().with_writer(io::stdout).with_ansi(true))
                    .try_init()?;

                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 全局 subscriber 只能设置一次，所以只在这一个测试里初始化
    #[test]
    fn test_init_with_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let config = LoggingConfig {
            level: "debug".to_string(),
            log_dir: Some(log_dir.clone()),
            file_prefix: "products-test".to_string(),
        };

        let guard = Logger::init(&config).unwrap();
        assert!(guard.is_some());
        assert!(log_dir.is_dir());

        tracing::info!("logger initialised");

        // 第二次初始化失败而不是 panic
        assert!(Logger::init(&config).is_err());
    }
}
