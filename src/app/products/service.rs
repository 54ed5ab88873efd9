//! 产品业务服务

use tracing::{info, warn};

use super::model::{CreateProductRequest, Product};
use super::store::{ProductStore, StoreError};
use super::validation::ValidationRules;
use crate::config::MatchMode;
use crate::core::error::CoreError;

#[derive(Clone)]
pub struct ProductService {
    store: ProductStore,
    rules: ValidationRules,
    match_mode: MatchMode,
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => CoreError::Duplicate,
            other => CoreError::Storage(other.to_string()),
        }
    }
}

impl ProductService {
    pub fn new(store: ProductStore, rules: ValidationRules, match_mode: MatchMode) -> Self {
        Self {
            store,
            rules,
            match_mode,
        }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, CoreError> {
        Ok(self.store.list_all().await?)
    }

    /// 没有匹配时返回空列表，不是错误
    pub async fn find_products(&self, name: &str) -> Result<Vec<Product>, CoreError> {
        Ok(self.store.find_by_name(name, self.match_mode).await?)
    }

    /// 先校验后写入；校验失败的请求不会触达数据库
    pub async fn create_product(&self, req: &CreateProductRequest) -> Result<(), CoreError> {
        let product = self.rules.validate(req).map_err(CoreError::Validation)?;

        match self.store.insert(&product).await {
            Ok(()) => {
                info!("Created product: {} ({})", product.name, product.price);
                Ok(())
            }
            Err(StoreError::Duplicate) => {
                warn!("Duplicate product name rejected: {}", product.name);
                Err(CoreError::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }
}
