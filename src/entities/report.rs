use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Persisted report aggregate. Write-only; there is no read path.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub report_type: String,

    pub category: Option<String>,

    pub period_start: Option<DateTime<Utc>>,

    pub period_end: Option<DateTime<Utc>>,

    pub total_sales: f64,

    pub total_transactions: i64,

    /// Opaque serialized payload
    pub data: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
