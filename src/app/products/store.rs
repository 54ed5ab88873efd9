//! 产品表的参数化 SQL 访问
//!
//! 所有外部输入都通过 `bind` 传入，不拼接进 SQL 文本；每条语句都有超时上限。

use sqlx::AnyPool;
use sqlx::mysql::MySqlDatabaseError;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use super::model::{NewProduct, Product};
use crate::config::MatchMode;

/// MySQL 的 ER_DUP_ENTRY
const MYSQL_DUPLICATE_ENTRY: u16 = 1062;

/// LIKE 的转义字符，MySQL 和 SQLite 的字符串字面量里都不需要再转义
const LIKE_ESCAPE: char = '!';

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate product name")]
    Duplicate,
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct ProductStore {
    pool: AnyPool,
    query_timeout: Duration,
}

impl ProductStore {
    pub fn new(pool: AnyPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// 全部产品，顺序由数据库决定
    pub async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        bounded(
            self.query_timeout,
            sqlx::query_as::<_, Product>("SELECT id, name, price FROM products")
                .fetch_all(&self.pool),
        )
        .await
    }

    /// 按名称查询；大小写敏感性取决于数据库排序规则
    pub async fn find_by_name(
        &self,
        term: &str,
        mode: MatchMode,
    ) -> Result<Vec<Product>, StoreError> {
        debug!("Looking up products by name ({:?})", mode);
        let query = match mode {
            MatchMode::Contains => sqlx::query_as::<_, Product>(
                "SELECT id, name, price FROM products WHERE name LIKE ? ESCAPE '!'",
            )
            .bind(format!("%{}%", escape_like(term))),
            MatchMode::Exact => {
                sqlx::query_as::<_, Product>("SELECT id, name, price FROM products WHERE name = ?")
                    .bind(term.to_string())
            }
        };

        bounded(self.query_timeout, query.fetch_all(&self.pool)).await
    }

    /// 插入一条产品；名称重复时返回 `StoreError::Duplicate`，表不变
    pub async fn insert(&self, product: &NewProduct) -> Result<(), StoreError> {
        let result = bounded(
            self.query_timeout,
            sqlx::query("INSERT INTO products (name, price) VALUES (?, ?)")
                .bind(product.name.clone())
                .bind(product.price)
                .execute(&self.pool),
        )
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(StoreError::Database(err)) if is_unique_violation(&err) => {
                Err(StoreError::Duplicate)
            }
            Err(err) => Err(err),
        }
    }
}

/// 给单条语句加超时上限
pub async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout(timeout)),
    }
}

/// 转义 LIKE 通配符，让 `%` 和 `_` 按字面匹配
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    let Some(db_err) = err.as_database_error() else {
        return false;
    };

    if db_err.is_unique_violation() {
        return true;
    }

    db_err
        .try_downcast_ref::<MySqlDatabaseError>()
        .is_some_and(|e| e.number() == MYSQL_DUPLICATE_ENTRY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatusPolicy;
    use crate::core::{
        error::CoreError,
        response::{ResponsePolicy, STORAGE_FAILURE_MESSAGE},
    };
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_bounded_times_out() {
        let timeout = Duration::from_millis(20);
        let result =
            bounded::<(), _>(timeout, std::future::pending::<Result<(), sqlx::Error>>()).await;
        assert!(matches!(result, Err(StoreError::Timeout(d)) if d == timeout));
    }

    #[tokio::test]
    async fn test_bounded_passes_through_result() {
        let result = bounded(Duration::from_secs(1), async { Ok::<_, sqlx::Error>(7) }).await;
        assert_eq!(result.unwrap(), 7);

        let result = bounded::<(), _>(Duration::from_secs(1), async {
            Err(sqlx::Error::PoolClosed)
        })
        .await;
        assert!(matches!(result, Err(StoreError::Database(sqlx::Error::PoolClosed))));
    }

    #[test]
    fn test_query_timeout_renders_as_storage_failure() {
        let err = CoreError::from(StoreError::Timeout(Duration::from_secs(5)));
        assert!(matches!(err, CoreError::Storage(_)));

        let rejection = ResponsePolicy::default().reject(err);
        assert_eq!(rejection.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(rejection.body.msg, STORAGE_FAILURE_MESSAGE);

        let uniform = ResponsePolicy {
            status_policy: StatusPolicy::Uniform,
            ..Default::default()
        };
        let rejection =
            uniform.reject(CoreError::from(StoreError::Timeout(Duration::from_secs(5))));
        assert_eq!(rejection.status, StatusCode::ACCEPTED);
        assert_eq!(rejection.body.msg, STORAGE_FAILURE_MESSAGE);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("abc"), "abc");
        assert_eq!(escape_like("50%"), "50!%");
        assert_eq!(escape_like("a_b"), "a!_b");
        assert_eq!(escape_like("hi!"), "hi!!");
        assert_eq!(escape_like("' OR 1=1 --"), "' OR 1=1 --");
    }
}
