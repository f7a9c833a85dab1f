//! Domain types shared by the HTTP layer and both storage backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder used when a sale item carries no customer name.
pub const UNKNOWN_CUSTOMER_NAME: &str = "Cliente não informado";
/// Placeholder used when a sale item carries no customer document.
pub const UNKNOWN_CUSTOMER_DOCUMENT: &str = "Não informado";

/// Closed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Cashier,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Cashier => "cashier",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "cashier" => Ok(UserRole::Cashier),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored user account. The password hash never leaves the process.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub category: String,
    pub permissions: Vec<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Input for user creation. The password arrives in plaintext and is hashed
/// by the storage backend before persisting.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    pub category: String,
    pub permissions: Vec<String>,
}

/// Full-replacement user update. `password` is re-hashed when present;
/// the stored hash is kept otherwise.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub password: Option<String>,
    pub name: String,
    pub role: UserRole,
    pub category: String,
    pub permissions: Vec<String>,
    pub is_active: bool,
}

/// Per-category register balance record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashControl {
    pub category: String,
    pub is_open: bool,
    pub initial_cash: f64,
    pub current_balance: f64,
    pub today_sales: f64,
    #[serde(default)]
    pub last_opened: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_closed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub observations: Option<String>,
}

impl CashControl {
    /// The zero-valued record materialized for categories never written.
    pub fn empty(category: &str) -> Self {
        Self {
            category: category.to_string(),
            is_open: false,
            initial_cash: 0.0,
            current_balance: 0.0,
            today_sales: 0.0,
            last_opened: None,
            last_closed: None,
            observations: None,
        }
    }
}

/// A recorded sale. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct Sale {
    pub sale_id: String,
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub cashier: String,
    pub total: f64,
    pub payment_method: String,
    pub change_amount: f64,
    pub status: String,
    pub observations: String,
    /// Concatenated "name (xqty)" item summary. Only populated by the
    /// relational backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<String>,
}

/// Input for sale creation; items are written alongside the sale in the
/// same logical operation.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub category: String,
    pub cashier: String,
    pub total: f64,
    pub payment_method: String,
    pub change_amount: f64,
    pub status: String,
    pub observations: String,
    pub items: Vec<NewSaleItem>,
}

/// One line of a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSaleItem {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_document: Option<String>,
    pub product_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub product_id: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub total: f64,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub observations: Option<String>,
}

impl NewSaleItem {
    pub fn customer_name(&self) -> &str {
        self.customer_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_CUSTOMER_NAME)
    }

    pub fn customer_document(&self) -> &str {
        self.customer_document
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_CUSTOMER_DOCUMENT)
    }
}

/// Closed set of catalog entry types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Product,
    Membership,
    Daily,
    Biweekly,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Product => "product",
            ProductType::Membership => "membership",
            ProductType::Daily => "daily",
            ProductType::Biweekly => "biweekly",
        }
    }
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(ProductType::Product),
            "membership" => Ok(ProductType::Membership),
            "daily" => Ok(ProductType::Daily),
            "biweekly" => Ok(ProductType::Biweekly),
            other => Err(format!("unknown product type '{other}'")),
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for catalog entry creation.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub product_type: ProductType,
    pub description: String,
}

/// Aggregate persisted when a sales report is generated. Write-only.
#[derive(Debug, Clone)]
pub struct SalesReportRecord {
    pub report_type: String,
    pub category: String,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub total_sales: f64,
    pub total_transactions: i64,
    pub data: String,
}

/// Accepts a JSON string or number for identifiers; the relational catalog
/// uses integer ids, the wide-column catalog uses generated strings, and
/// point-of-sale clients send back whichever they were given.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("cashier".parse::<UserRole>().unwrap(), UserRole::Cashier);
        assert!("manager".parse::<UserRole>().is_err());
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }

    #[test]
    fn product_type_is_closed() {
        for (raw, expected) in [
            ("product", ProductType::Product),
            ("membership", ProductType::Membership),
            ("daily", ProductType::Daily),
            ("biweekly", ProductType::Biweekly),
        ] {
            assert_eq!(raw.parse::<ProductType>().unwrap(), expected);
        }
        assert!("monthly".parse::<ProductType>().is_err());
    }

    #[test]
    fn sale_item_defaults_customer_placeholders() {
        let item: NewSaleItem = serde_json::from_value(serde_json::json!({
            "product_name": "Whey Protein",
            "quantity": 1,
            "unit_price": 89.9,
            "total": 89.9,
            "type": "product"
        }))
        .unwrap();

        assert_eq!(item.customer_name(), UNKNOWN_CUSTOMER_NAME);
        assert_eq!(item.customer_document(), UNKNOWN_CUSTOMER_DOCUMENT);
        assert_eq!(item.product_id, None);
    }

    #[test]
    fn sale_item_accepts_numeric_product_id() {
        let item: NewSaleItem = serde_json::from_value(serde_json::json!({
            "product_name": "Creatina",
            "product_id": 9,
            "quantity": 2,
            "unit_price": 45.0,
            "total": 90.0,
            "type": "product"
        }))
        .unwrap();
        assert_eq!(item.product_id.as_deref(), Some("9"));

        let item: NewSaleItem = serde_json::from_value(serde_json::json!({
            "product_name": "Creatina",
            "product_id": "PRODUCT_1700000000000_ab12cd34e",
            "quantity": 1,
            "unit_price": 45.0,
            "total": 45.0,
            "type": "product"
        }))
        .unwrap();
        assert_eq!(
            item.product_id.as_deref(),
            Some("PRODUCT_1700000000000_ab12cd34e")
        );
    }
}
