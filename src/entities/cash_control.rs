use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cash register balance snapshot, one row per shift category.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_control")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub category: String,

    pub is_open: bool,

    pub initial_cash: f64,

    pub current_balance: f64,

    pub today_sales: f64,

    pub last_opened: Option<DateTime<Utc>>,

    pub last_closed: Option<DateTime<Utc>>,

    pub observations: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
