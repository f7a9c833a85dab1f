//! DynamoDB storage backend.
//!
//! Single-table layout addressed by composite keys:
//! - `USER#<username>` / `PROFILE`
//! - `CASH#<category>` / `CONTROL`
//! - `SALE#<sale_id>` / `INFO` and `SALE#<sale_id>` / `ITEM#<index>`
//! - `PRODUCT#<product_id>` / `INFO`

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

use crate::auth;
use crate::config::AppConfig;
use crate::models::{
    CashControl, NewProduct, NewSale, NewUser, Product, Sale, SalesReportRecord, User, UserRole,
    UserUpdate,
};

use super::{generate_id, seed, StorageBackend, StorageError};

const PK: &str = "PK";
const SK: &str = "SK";

pub struct DynamoBackend {
    client: Client,
    table: String,
}

impl DynamoBackend {
    /// Load AWS configuration for the configured region and seed the table
    /// when empty.
    pub async fn connect(config: &AppConfig) -> Result<Self, StorageError> {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .load()
            .await;

        let backend = Self {
            client: Client::new(&aws_config),
            table: config.dynamodb_table.clone(),
        };
        info!(table = %backend.table, "Connected to DynamoDB");

        if config.seed_data {
            backend.ensure_seed_data().await?;
        }
        Ok(backend)
    }

    async fn ensure_seed_data(&self) -> Result<(), StorageError> {
        if self.list_users().await?.is_empty() {
            info!("inserting initial users");
            for new_user in seed::initial_users() {
                self.create_user(&new_user).await?;
            }
        }

        if self.list_products().await?.is_empty() {
            info!("inserting initial product catalog");
            for new_product in seed::initial_products() {
                self.create_product(&new_product).await?;
            }
        }

        Ok(())
    }

    async fn get_user_item(
        &self,
        username: &str,
    ) -> Result<Option<HashMap<String, AttributeValue>>, StorageError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(PK, s(user_pk(username)))
            .key(SK, s("PROFILE"))
            .send()
            .await
            .map_err(|e| StorageError::Dynamo(e.to_string()))?;
        Ok(result.item)
    }

    fn user_item(
        &self,
        username: &str,
        id: &str,
        password_hash: &str,
        name: &str,
        role: UserRole,
        category: &str,
        permissions: &[String],
        created_at: DateTime<Utc>,
        last_login: Option<DateTime<Utc>>,
        is_active: bool,
    ) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::from([
            (PK.to_string(), s(user_pk(username))),
            (SK.to_string(), s("PROFILE")),
            ("id".to_string(), s(id)),
            ("username".to_string(), s(username)),
            ("password_hash".to_string(), s(password_hash)),
            ("name".to_string(), s(name)),
            ("role".to_string(), s(role.as_str())),
            ("category".to_string(), s(category)),
            ("permissions".to_string(), string_list(permissions)),
            ("created_at".to_string(), s(fmt_time(created_at))),
            ("is_active".to_string(), AttributeValue::Bool(is_active)),
        ]);
        if let Some(ts) = last_login {
            item.insert("last_login".to_string(), s(fmt_time(ts)));
        }
        item
    }

    async fn put(&self, item: HashMap<String, AttributeValue>) -> Result<(), StorageError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| StorageError::Dynamo(e.to_string()))?;
        Ok(())
    }

    /// Scan for all records of one entity kind, e.g. every `USER#`/`PROFILE`
    /// item. Matches the single-call scan the legacy data set stays within.
    async fn scan_kind(
        &self,
        pk_prefix: &str,
        sk: &str,
    ) -> Result<Vec<HashMap<String, AttributeValue>>, StorageError> {
        let result = self
            .client
            .scan()
            .table_name(&self.table)
            .filter_expression("begins_with(#pk, :pk) AND #sk = :sk")
            .expression_attribute_names("#pk", PK)
            .expression_attribute_names("#sk", SK)
            .expression_attribute_values(":pk", s(pk_prefix))
            .expression_attribute_values(":sk", s(sk))
            .send()
            .await
            .map_err(|e| StorageError::Dynamo(e.to_string()))?;
        Ok(result.items.unwrap_or_default())
    }
}

fn user_pk(username: &str) -> String {
    format!("USER#{username}")
}

fn cash_pk(category: &str) -> String {
    format!("CASH#{category}")
}

fn sale_pk(sale_id: &str) -> String {
    format!("SALE#{sale_id}")
}

fn product_pk(product_id: &str) -> String {
    format!("PRODUCT#{product_id}")
}

fn fmt_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn s(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

fn num(value: f64) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

fn string_list(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().map(|v| s(v.clone())).collect())
}

fn get_s(item: &HashMap<String, AttributeValue>, key: &str) -> Option<String> {
    match item.get(key) {
        Some(AttributeValue::S(v)) => Some(v.clone()),
        _ => None,
    }
}

fn require_s(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String, StorageError> {
    get_s(item, key).ok_or_else(|| StorageError::Corrupt(format!("missing attribute '{key}'")))
}

fn get_f64(item: &HashMap<String, AttributeValue>, key: &str) -> f64 {
    match item.get(key) {
        Some(AttributeValue::N(v)) => v.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn get_bool(item: &HashMap<String, AttributeValue>, key: &str) -> bool {
    matches!(item.get(key), Some(AttributeValue::Bool(true)))
}

fn get_string_list(item: &HashMap<String, AttributeValue>, key: &str) -> Vec<String> {
    match item.get(key) {
        Some(AttributeValue::L(values)) => values
            .iter()
            .filter_map(|v| match v {
                AttributeValue::S(text) => Some(text.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn get_time(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<Option<DateTime<Utc>>, StorageError> {
    match get_s(item, key) {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| StorageError::Corrupt(format!("timestamp '{key}': {e}"))),
        None => Ok(None),
    }
}

fn require_time(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<DateTime<Utc>, StorageError> {
    get_time(item, key)?.ok_or_else(|| StorageError::Corrupt(format!("missing attribute '{key}'")))
}

fn to_user(item: &HashMap<String, AttributeValue>) -> Result<User, StorageError> {
    let role: UserRole = require_s(item, "role")?
        .parse()
        .map_err(StorageError::Corrupt)?;

    Ok(User {
        id: require_s(item, "id")?,
        username: require_s(item, "username")?,
        password_hash: require_s(item, "password_hash")?,
        name: require_s(item, "name")?,
        role,
        category: require_s(item, "category")?,
        permissions: get_string_list(item, "permissions"),
        last_login: get_time(item, "last_login")?,
        created_at: require_time(item, "created_at")?,
        is_active: get_bool(item, "is_active"),
    })
}

fn to_sale(item: &HashMap<String, AttributeValue>) -> Result<Sale, StorageError> {
    Ok(Sale {
        sale_id: require_s(item, "sale_id")?,
        timestamp: require_time(item, "timestamp")?,
        category: require_s(item, "category")?,
        cashier: require_s(item, "cashier")?,
        total: get_f64(item, "total"),
        payment_method: require_s(item, "payment_method")?,
        change_amount: get_f64(item, "change_amount"),
        status: get_s(item, "status").unwrap_or_else(|| "completed".to_string()),
        observations: get_s(item, "observations").unwrap_or_default(),
        products: None,
    })
}

fn to_product(item: &HashMap<String, AttributeValue>) -> Result<Product, StorageError> {
    let product_type = require_s(item, "type")?
        .parse()
        .map_err(StorageError::Corrupt)?;

    Ok(Product {
        id: require_s(item, "id")?,
        name: require_s(item, "name")?,
        price: get_f64(item, "price"),
        product_type,
        description: get_s(item, "description").unwrap_or_default(),
        is_active: get_bool(item, "is_active"),
        created_at: require_time(item, "created_at")?,
    })
}

#[async_trait]
impl StorageBackend for DynamoBackend {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StorageError> {
        let Some(item) = self.get_user_item(username).await? else {
            return Ok(None);
        };

        let user = to_user(&item)?;
        if !user.is_active || !auth::verify_password(password, &user.password_hash) {
            return Ok(None);
        }
        Ok(Some(user))
    }

    async fn touch_last_login(&self, user: &User) -> Result<(), StorageError> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key(PK, s(user_pk(&user.username)))
            .key(SK, s("PROFILE"))
            .update_expression("SET last_login = :ts")
            .expression_attribute_values(":ts", s(fmt_time(Utc::now())))
            .send()
            .await
            .map_err(|e| StorageError::Dynamo(e.to_string()))?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let items = self.scan_kind("USER#", "PROFILE").await?;
        let mut users: Vec<User> = items
            .iter()
            .map(to_user)
            .collect::<Result<_, StorageError>>()?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<String, StorageError> {
        if self.get_user_item(&new_user.username).await?.is_some() {
            return Err(StorageError::DuplicateUsername);
        }

        let id = generate_id("USER");
        let item = self.user_item(
            &new_user.username,
            &id,
            &auth::hash_password(&new_user.password)?,
            &new_user.name,
            new_user.role,
            &new_user.category,
            &new_user.permissions,
            Utc::now(),
            None,
            true,
        );
        self.put(item).await?;
        Ok(id)
    }

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<(), StorageError> {
        // User records are keyed by username, so the route id is the
        // username here.
        let existing = self.get_user_item(id).await?;

        let (record_id, created_at, last_login, existing_hash) = match &existing {
            Some(item) => (
                require_s(item, "id")?,
                require_time(item, "created_at")?,
                get_time(item, "last_login")?,
                get_s(item, "password_hash"),
            ),
            None => (generate_id("USER"), Utc::now(), None, None),
        };

        let password_hash = match &update.password {
            Some(password) if !password.is_empty() => auth::hash_password(password)?,
            _ => existing_hash.unwrap_or_default(),
        };

        let item = self.user_item(
            id,
            &record_id,
            &password_hash,
            &update.name,
            update.role,
            &update.category,
            &update.permissions,
            created_at,
            last_login,
            update.is_active,
        );
        self.put(item).await
    }

    async fn delete_user(&self, id: &str) -> Result<(), StorageError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key(PK, s(user_pk(id)))
            .key(SK, s("PROFILE"))
            .send()
            .await
            .map_err(|e| StorageError::Dynamo(e.to_string()))?;
        Ok(())
    }

    async fn cash_control(&self, category: &str) -> Result<CashControl, StorageError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(PK, s(cash_pk(category)))
            .key(SK, s("CONTROL"))
            .send()
            .await
            .map_err(|e| StorageError::Dynamo(e.to_string()))?;

        match result.item {
            Some(item) => Ok(CashControl {
                category: category.to_string(),
                is_open: get_bool(&item, "is_open"),
                initial_cash: get_f64(&item, "initial_cash"),
                current_balance: get_f64(&item, "current_balance"),
                today_sales: get_f64(&item, "today_sales"),
                last_opened: get_time(&item, "last_opened")?,
                last_closed: get_time(&item, "last_closed")?,
                observations: get_s(&item, "observations"),
            }),
            None => Ok(CashControl::empty(category)),
        }
    }

    async fn put_cash_control(
        &self,
        category: &str,
        record: &CashControl,
    ) -> Result<(), StorageError> {
        let mut item = HashMap::from([
            (PK.to_string(), s(cash_pk(category))),
            (SK.to_string(), s("CONTROL")),
            ("category".to_string(), s(category)),
            (
                "is_open".to_string(),
                AttributeValue::Bool(record.is_open),
            ),
            ("initial_cash".to_string(), num(record.initial_cash)),
            ("current_balance".to_string(), num(record.current_balance)),
            ("today_sales".to_string(), num(record.today_sales)),
            ("updated_at".to_string(), s(fmt_time(Utc::now()))),
        ]);
        if let Some(ts) = record.last_opened {
            item.insert("last_opened".to_string(), s(fmt_time(ts)));
        }
        if let Some(ts) = record.last_closed {
            item.insert("last_closed".to_string(), s(fmt_time(ts)));
        }
        if let Some(observations) = &record.observations {
            item.insert("observations".to_string(), s(observations.clone()));
        }
        self.put(item).await
    }

    async fn create_sale(&self, sale: &NewSale) -> Result<String, StorageError> {
        let sale_id = generate_id("SALE");
        let now = fmt_time(Utc::now());

        let info = HashMap::from([
            (PK.to_string(), s(sale_pk(&sale_id))),
            (SK.to_string(), s("INFO")),
            ("sale_id".to_string(), s(sale_id.clone())),
            ("category".to_string(), s(sale.category.clone())),
            ("cashier".to_string(), s(sale.cashier.clone())),
            ("total".to_string(), num(sale.total)),
            ("payment_method".to_string(), s(sale.payment_method.clone())),
            ("change_amount".to_string(), num(sale.change_amount)),
            ("status".to_string(), s(sale.status.clone())),
            ("observations".to_string(), s(sale.observations.clone())),
            ("timestamp".to_string(), s(now.clone())),
            ("created_at".to_string(), s(now.clone())),
        ]);
        self.put(info).await?;

        for (index, sale_item) in sale.items.iter().enumerate() {
            let mut item = HashMap::from([
                (PK.to_string(), s(sale_pk(&sale_id))),
                (SK.to_string(), s(format!("ITEM#{index}"))),
                ("sale_id".to_string(), s(sale_id.clone())),
                ("customer_name".to_string(), s(sale_item.customer_name())),
                (
                    "customer_document".to_string(),
                    s(sale_item.customer_document()),
                ),
                (
                    "product_name".to_string(),
                    s(sale_item.product_name.clone()),
                ),
                (
                    "quantity".to_string(),
                    AttributeValue::N(sale_item.quantity.to_string()),
                ),
                ("unit_price".to_string(), num(sale_item.unit_price)),
                ("total".to_string(), num(sale_item.total)),
                ("type".to_string(), s(sale_item.item_type.clone())),
                (
                    "observations".to_string(),
                    s(sale_item.observations.clone().unwrap_or_default()),
                ),
                ("created_at".to_string(), s(now.clone())),
            ]);
            if let Some(product_id) = &sale_item.product_id {
                item.insert("product_id".to_string(), s(product_id.clone()));
            }
            self.put(item).await?;
        }

        debug!(sale_id = %sale_id, items = sale.items.len(), "sale recorded");
        Ok(sale_id)
    }

    async fn list_sales(
        &self,
        category: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Sale>, StorageError> {
        let mut filter =
            String::from("begins_with(#pk, :pk) AND #sk = :sk AND category = :category");
        let mut scan = self
            .client
            .scan()
            .table_name(&self.table)
            .expression_attribute_names("#pk", PK)
            .expression_attribute_names("#sk", SK)
            .expression_attribute_values(":pk", s("SALE#"))
            .expression_attribute_values(":sk", s("INFO"))
            .expression_attribute_values(":category", s(category));

        if let Some((start, end)) = range {
            filter.push_str(" AND #ts BETWEEN :start AND :end");
            scan = scan
                .expression_attribute_names("#ts", "timestamp")
                .expression_attribute_values(":start", s(fmt_time(start)))
                .expression_attribute_values(":end", s(fmt_time(end)));
        }

        let result = scan
            .filter_expression(filter)
            .send()
            .await
            .map_err(|e| StorageError::Dynamo(e.to_string()))?;

        let mut sales: Vec<Sale> = result
            .items
            .unwrap_or_default()
            .iter()
            .map(to_sale)
            .collect::<Result<_, StorageError>>()?;
        sales.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(sales)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StorageError> {
        let items = self.scan_kind("PRODUCT#", "INFO").await?;
        let mut products: Vec<Product> = items
            .iter()
            .map(to_product)
            .collect::<Result<_, StorageError>>()?;
        products.retain(|p| p.is_active);
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn create_product(&self, new_product: &NewProduct) -> Result<String, StorageError> {
        let id = generate_id("PRODUCT");
        let item = HashMap::from([
            (PK.to_string(), s(product_pk(&id))),
            (SK.to_string(), s("INFO")),
            ("id".to_string(), s(id.clone())),
            ("name".to_string(), s(new_product.name.clone())),
            ("price".to_string(), num(new_product.price)),
            ("type".to_string(), s(new_product.product_type.as_str())),
            (
                "description".to_string(),
                s(new_product.description.clone()),
            ),
            ("is_active".to_string(), AttributeValue::Bool(true)),
            ("created_at".to_string(), s(fmt_time(Utc::now()))),
        ]);
        self.put(item).await?;
        Ok(id)
    }

    async fn record_report(&self, _record: &SalesReportRecord) -> Result<(), StorageError> {
        // Reports are only persisted by the relational backend.
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "DynamoDB"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_keys_follow_single_table_layout() {
        assert_eq!(user_pk("admin"), "USER#admin");
        assert_eq!(cash_pk("caixa-manha"), "CASH#caixa-manha");
        assert_eq!(sale_pk("SALE_1_a"), "SALE#SALE_1_a");
        assert_eq!(product_pk("PRODUCT_1_a"), "PRODUCT#PRODUCT_1_a");
    }

    #[test]
    fn timestamps_are_millisecond_rfc3339() {
        let ts = DateTime::parse_from_rfc3339("2026-01-02T03:04:05.678Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(fmt_time(ts), "2026-01-02T03:04:05.678Z");
    }

    #[test]
    fn user_round_trip_through_attribute_map() {
        let backend_time = Utc::now();
        let mut item = HashMap::from([
            ("id".to_string(), s("USER_1_abc")),
            ("username".to_string(), s("caixa_manha")),
            ("password_hash".to_string(), s("$argon2id$fake")),
            ("name".to_string(), s("Caixa Manhã")),
            ("role".to_string(), s("cashier")),
            ("category".to_string(), s("caixa-manha")),
            (
                "permissions".to_string(),
                string_list(&["add_sales".to_string()]),
            ),
            ("created_at".to_string(), s(fmt_time(backend_time))),
            ("is_active".to_string(), AttributeValue::Bool(true)),
        ]);

        let user = to_user(&item).unwrap();
        assert_eq!(user.username, "caixa_manha");
        assert_eq!(user.role, UserRole::Cashier);
        assert_eq!(user.permissions, vec!["add_sales".to_string()]);
        assert!(user.last_login.is_none());

        item.insert("role".to_string(), s("superuser"));
        assert!(to_user(&item).is_err());
    }

    #[test]
    fn missing_numeric_attributes_default_to_zero() {
        let item = HashMap::from([("total".to_string(), s("not-a-number"))]);
        assert_eq!(get_f64(&item, "total"), 0.0);
        assert_eq!(get_f64(&item, "absent"), 0.0);
    }
}
