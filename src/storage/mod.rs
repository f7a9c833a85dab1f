//! Storage backends.
//!
//! One logical contract, two implementations: an embedded SQLite store
//! (sea-orm) and a DynamoDB table addressed by composite PK/SK keys. The
//! backend is chosen once at startup from configuration; handlers only ever
//! see `Arc<dyn StorageBackend>`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use crate::config::AppConfig;
use crate::models::{
    CashControl, NewProduct, NewSale, NewUser, Product, Sale, SalesReportRecord, User, UserUpdate,
};

pub mod dynamo;
pub mod relational;
mod seed;

pub use dynamo::DynamoBackend;
pub use relational::RelationalBackend;

/// Faults raised by either backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("dynamodb error: {0}")]
    Dynamo(String),

    #[error("username already exists")]
    DuplicateUsername,

    #[error("invalid stored record: {0}")]
    Corrupt(String),
}

/// Operation contract shared by both storage variants.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Look up an active user by credentials. `None` covers unknown
    /// username, wrong password and deactivated accounts alike.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StorageError>;

    /// Stamp the user's last login with the current time.
    async fn touch_last_login(&self, user: &User) -> Result<(), StorageError>;

    /// All users, newest first.
    async fn list_users(&self) -> Result<Vec<User>, StorageError>;

    /// Create a user; fails with [`StorageError::DuplicateUsername`] when the
    /// username is taken.
    async fn create_user(&self, user: &NewUser) -> Result<String, StorageError>;

    /// Full-replacement update. The id is the integer primary key on the
    /// relational backend and the username on the wide-column backend.
    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<(), StorageError>;

    async fn delete_user(&self, id: &str) -> Result<(), StorageError>;

    /// Current register record for a category; categories never written
    /// materialize as a zero-valued default, never as an error.
    async fn cash_control(&self, category: &str) -> Result<CashControl, StorageError>;

    /// Wholesale overwrite of the register record.
    async fn put_cash_control(
        &self,
        category: &str,
        record: &CashControl,
    ) -> Result<(), StorageError>;

    /// Persist a sale and all of its items in one logical operation,
    /// returning the generated sale identifier.
    async fn create_sale(&self, sale: &NewSale) -> Result<String, StorageError>;

    /// Sales for a category, newest first. When a range is given the filter
    /// is inclusive on both bounds.
    async fn list_sales(
        &self,
        category: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Sale>, StorageError>;

    /// Active catalog entries, alphabetical.
    async fn list_products(&self) -> Result<Vec<Product>, StorageError>;

    async fn create_product(&self, product: &NewProduct) -> Result<String, StorageError>;

    /// Persist a generated report aggregate. Only the relational backend
    /// stores these; the wide-column backend ignores them.
    async fn record_report(&self, report: &SalesReportRecord) -> Result<(), StorageError>;

    /// Human-readable backend name, reported by the health endpoint.
    fn backend_name(&self) -> &'static str;
}

/// Initialize the storage backend selected by configuration.
pub async fn init_storage(config: &AppConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match config.storage_backend.to_ascii_lowercase().as_str() {
        "sqlite" => {
            info!(url = %config.database_url, "Using SQLite storage backend");
            Ok(Arc::new(RelationalBackend::connect(config).await?))
        }
        "dynamodb" => {
            info!(
                table = %config.dynamodb_table,
                region = %config.aws_region,
                "Using DynamoDB storage backend"
            );
            Ok(Arc::new(DynamoBackend::connect(config).await?))
        }
        other => Err(StorageError::Corrupt(format!(
            "unknown storage backend '{other}'"
        ))),
    }
}

/// Generate a record identifier of the form `<PREFIX>_<millis>_<suffix>`,
/// where the suffix is nine base-36 characters. Best-effort uniqueness;
/// there is no retry on collision.
pub fn generate_id(prefix: &str) -> String {
    const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_prefix_and_suffix() {
        let id = generate_id("SALE");
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "SALE");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_ids_differ() {
        let a = generate_id("PRODUCT");
        let b = generate_id("PRODUCT");
        assert_ne!(a, b);
    }
}
