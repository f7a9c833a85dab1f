use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Point-of-sale transaction entity. Rows are immutable once written.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Generated identifier of the form SALE_<millis>_<suffix>
    #[sea_orm(unique)]
    pub sale_id: String,

    pub timestamp: DateTime<Utc>,

    /// Cashier-shift label this sale belongs to
    pub category: String,

    pub cashier: String,

    pub total: f64,

    pub payment_method: String,

    pub change_amount: f64,

    pub status: String,

    pub observations: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sale_item::Entity")]
    SaleItems,
}

impl Related<super::sale_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
