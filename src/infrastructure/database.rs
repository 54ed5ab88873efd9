//! 数据库基础设施

use sqlx::{any::AnyPoolOptions, AnyPool};
use sqlx::Error;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

/// 连接串对应的数据库方言；`mariadb:` 走 MySQL 驱动
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MySql,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("mysql:") || url.starts_with("mariadb:") {
            Some(Backend::MySql)
        } else if url.starts_with("sqlite:") {
            Some(Backend::Sqlite)
        } else {
            None
        }
    }

    fn create_products_table(self) -> &'static str {
        match self {
            Backend::MySql => {
                r#"
                CREATE TABLE IF NOT EXISTS products (
                    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
                    name VARCHAR(255) NOT NULL UNIQUE,
                    price DOUBLE NOT NULL
                )
                "#
            }
            Backend::Sqlite => {
                r#"
                CREATE TABLE IF NOT EXISTS products (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    price REAL NOT NULL
                )
                "#
            }
        }
    }
}

/// 进程级连接池，启动时创建一次，退出前关闭
#[derive(Clone)]
pub struct DatabaseManager {
    pool: AnyPool,
    backend: Backend,
}

impl DatabaseManager {
    pub async fn new(database_url: &str, config: &DatabaseConfig) -> Result<Self, Error> {
        let backend = Backend::from_url(database_url).ok_or_else(|| {
            Error::Configuration(
                format!("unsupported database url scheme: {}", redact(database_url)).into(),
            )
        })?;

        sqlx::any::install_default_drivers();

        info!("Connecting to database: {}", redact(database_url));

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(config.idle_timeout_secs.map(Duration::from_secs))
            .max_lifetime(config.max_lifetime_secs.map(Duration::from_secs))
            .connect(database_url)
            .await?;

        Ok(Self { pool, backend })
    }

    pub fn get_pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// 建表（不是迁移系统，只保证表存在）
    pub async fn ensure_schema(&self) -> Result<(), Error> {
        info!("Ensuring products table exists...");
        sqlx::query(self.backend.create_products_table())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// 连通性检查
    pub async fn ping(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// 日志中隐藏连接串里的密码
pub fn redact(database_url: &str) -> String {
    match url::Url::parse(database_url) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => database_url.to_string(),
    }
}
