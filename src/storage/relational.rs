//! SQLite storage backend built on sea-orm.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::auth;
use crate::config::AppConfig;
use crate::entities::{cash_control, product, report, sale, sale_item, user};
use crate::migrator::Migrator;
use crate::models::{
    CashControl, NewProduct, NewSale, NewUser, Product, Sale, SalesReportRecord, User, UserUpdate,
};

use super::{generate_id, seed, StorageBackend, StorageError};

/// Storage backend over a single long-lived SQLite connection pool.
pub struct RelationalBackend {
    db: DatabaseConnection,
}

impl RelationalBackend {
    /// Connect, run migrations and insert seed data as configured.
    pub async fn connect(config: &AppConfig) -> Result<Self, StorageError> {
        let mut opt = ConnectOptions::new(config.database_url.clone());
        opt.max_connections(8).sqlx_logging(false);

        let db = Database::connect(opt).await?;

        if config.auto_migrate {
            Migrator::up(&db, None).await?;
            debug!("database migrations applied");
        }

        let backend = Self { db };
        if config.seed_data {
            backend.ensure_seed_data().await?;
        }
        Ok(backend)
    }

    async fn ensure_seed_data(&self) -> Result<(), StorageError> {
        if user::Entity::find().count(&self.db).await? == 0 {
            info!("inserting initial users");
            for new_user in seed::initial_users() {
                self.create_user(&new_user).await?;
            }
        }

        if product::Entity::find().count(&self.db).await? == 0 {
            info!("inserting initial product catalog");
            for new_product in seed::initial_products() {
                self.create_product(&new_product).await?;
            }
        }

        Ok(())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<user::Model>, StorageError> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }
}

fn to_user(model: user::Model) -> Result<User, StorageError> {
    let role = model
        .role
        .parse()
        .map_err(|e: String| StorageError::Corrupt(e))?;
    let permissions: Vec<String> = serde_json::from_str(&model.permissions)
        .map_err(|e| StorageError::Corrupt(format!("permissions for user {}: {e}", model.id)))?;

    Ok(User {
        id: model.id.to_string(),
        username: model.username,
        password_hash: model.password_hash,
        name: model.name,
        role,
        category: model.category,
        permissions,
        last_login: model.last_login,
        created_at: model.created_at,
        is_active: model.is_active,
    })
}

fn to_cash_control(model: cash_control::Model) -> CashControl {
    CashControl {
        category: model.category,
        is_open: model.is_open,
        initial_cash: model.initial_cash,
        current_balance: model.current_balance,
        today_sales: model.today_sales,
        last_opened: model.last_opened,
        last_closed: model.last_closed,
        observations: model.observations,
    }
}

fn to_product(model: product::Model) -> Result<Product, StorageError> {
    let product_type = model
        .product_type
        .parse()
        .map_err(|e: String| StorageError::Corrupt(e))?;

    Ok(Product {
        id: model.id.to_string(),
        name: model.name,
        price: model.price,
        product_type,
        description: model.description,
        is_active: model.is_active,
        created_at: model.created_at,
    })
}

fn encode_permissions(permissions: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(permissions)
        .map_err(|e| StorageError::Corrupt(format!("permissions encode: {e}")))
}

/// Parse the `:id` route parameter into the integer primary key. Ids that
/// never were keys simply address no row, matching the legacy behavior of
/// updates and deletes against unknown ids succeeding silently.
fn parse_user_id(id: &str) -> Option<i32> {
    id.parse().ok()
}

#[async_trait]
impl StorageBackend for RelationalBackend {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StorageError> {
        let Some(model) = self.find_user_by_username(username).await? else {
            return Ok(None);
        };

        if !model.is_active || !auth::verify_password(password, &model.password_hash) {
            return Ok(None);
        }

        to_user(model).map(Some)
    }

    async fn touch_last_login(&self, user: &User) -> Result<(), StorageError> {
        let Some(id) = parse_user_id(&user.id) else {
            return Ok(());
        };
        let Some(model) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(());
        };

        let mut active: user::ActiveModel = model.into();
        active.last_login = Set(Some(Utc::now()));
        active.update(&self.db).await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let rows = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .all(&self.db)
            .await?;

        rows.into_iter().map(to_user).collect()
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<String, StorageError> {
        if self
            .find_user_by_username(&new_user.username)
            .await?
            .is_some()
        {
            return Err(StorageError::DuplicateUsername);
        }

        let model = user::ActiveModel {
            username: Set(new_user.username.clone()),
            password_hash: Set(auth::hash_password(&new_user.password)?),
            name: Set(new_user.name.clone()),
            role: Set(new_user.role.as_str().to_string()),
            category: Set(new_user.category.clone()),
            permissions: Set(encode_permissions(&new_user.permissions)?),
            last_login: Set(None),
            created_at: Set(Utc::now()),
            is_active: Set(true),
            ..Default::default()
        };

        let result = user::Entity::insert(model).exec(&self.db).await?;
        Ok(result.last_insert_id.to_string())
    }

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<(), StorageError> {
        let Some(id) = parse_user_id(id) else {
            return Ok(());
        };
        let Some(existing) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(());
        };

        let password_hash = match &update.password {
            Some(password) if !password.is_empty() => auth::hash_password(password)?,
            _ => existing.password_hash.clone(),
        };

        let mut model: user::ActiveModel = existing.into();
        model.username = Set(update.username.clone());
        model.password_hash = Set(password_hash);
        model.name = Set(update.name.clone());
        model.role = Set(update.role.as_str().to_string());
        model.category = Set(update.category.clone());
        model.permissions = Set(encode_permissions(&update.permissions)?);
        model.is_active = Set(update.is_active);
        model.update(&self.db).await?;

        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), StorageError> {
        let Some(id) = parse_user_id(id) else {
            return Ok(());
        };
        user::Entity::delete_many()
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn cash_control(&self, category: &str) -> Result<CashControl, StorageError> {
        let row = cash_control::Entity::find()
            .filter(cash_control::Column::Category.eq(category))
            .order_by_desc(cash_control::Column::CreatedAt)
            .one(&self.db)
            .await?;

        Ok(row
            .map(to_cash_control)
            .unwrap_or_else(|| CashControl::empty(category)))
    }

    async fn put_cash_control(
        &self,
        category: &str,
        record: &CashControl,
    ) -> Result<(), StorageError> {
        let existing = cash_control::Entity::find()
            .filter(cash_control::Column::Category.eq(category))
            .one(&self.db)
            .await?;

        match existing {
            Some(row) => {
                let mut model: cash_control::ActiveModel = row.into();
                model.is_open = Set(record.is_open);
                model.initial_cash = Set(record.initial_cash);
                model.current_balance = Set(record.current_balance);
                model.today_sales = Set(record.today_sales);
                model.last_opened = Set(record.last_opened);
                model.last_closed = Set(record.last_closed);
                model.observations = Set(record.observations.clone());
                model.update(&self.db).await?;
            }
            None => {
                let model = cash_control::ActiveModel {
                    category: Set(category.to_string()),
                    is_open: Set(record.is_open),
                    initial_cash: Set(record.initial_cash),
                    current_balance: Set(record.current_balance),
                    today_sales: Set(record.today_sales),
                    last_opened: Set(record.last_opened),
                    last_closed: Set(record.last_closed),
                    observations: Set(record.observations.clone()),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                };
                cash_control::Entity::insert(model).exec(&self.db).await?;
            }
        }

        Ok(())
    }

    async fn create_sale(&self, sale: &NewSale) -> Result<String, StorageError> {
        let sale_id = generate_id("SALE");
        let now = Utc::now();

        let model = sale::ActiveModel {
            sale_id: Set(sale_id.clone()),
            timestamp: Set(now),
            category: Set(sale.category.clone()),
            cashier: Set(sale.cashier.clone()),
            total: Set(sale.total),
            payment_method: Set(sale.payment_method.clone()),
            change_amount: Set(sale.change_amount),
            status: Set(sale.status.clone()),
            observations: Set(sale.observations.clone()),
            created_at: Set(now),
            ..Default::default()
        };
        sale::Entity::insert(model).exec(&self.db).await?;

        let items: Vec<sale_item::ActiveModel> = sale
            .items
            .iter()
            .map(|item| sale_item::ActiveModel {
                sale_id: Set(sale_id.clone()),
                customer_name: Set(item.customer_name().to_string()),
                customer_document: Set(item.customer_document().to_string()),
                product_name: Set(item.product_name.clone()),
                product_id: Set(item.product_id.clone()),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                total: Set(item.total),
                item_type: Set(item.item_type.clone()),
                observations: Set(item.observations.clone().unwrap_or_default()),
                created_at: Set(now),
                ..Default::default()
            })
            .collect();

        if !items.is_empty() {
            sale_item::Entity::insert_many(items).exec(&self.db).await?;
        }

        debug!(sale_id = %sale_id, items = sale.items.len(), "sale recorded");
        Ok(sale_id)
    }

    async fn list_sales(
        &self,
        category: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Sale>, StorageError> {
        let mut query = sale::Entity::find().filter(sale::Column::Category.eq(category));

        if let Some((start, end)) = range {
            query = query.filter(sale::Column::Timestamp.between(start, end));
        }

        let rows = query
            .order_by_desc(sale::Column::Timestamp)
            .all(&self.db)
            .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let sale_ids: Vec<String> = rows.iter().map(|s| s.sale_id.clone()).collect();
        let items = sale_item::Entity::find()
            .filter(sale_item::Column::SaleId.is_in(sale_ids))
            .all(&self.db)
            .await?;

        let mut summaries: HashMap<String, Vec<String>> = HashMap::new();
        for item in items {
            summaries
                .entry(item.sale_id.clone())
                .or_default()
                .push(format!("{} (x{})", item.product_name, item.quantity));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let products = summaries.get(&row.sale_id).map(|names| names.join(","));
                Sale {
                    sale_id: row.sale_id,
                    timestamp: row.timestamp,
                    category: row.category,
                    cashier: row.cashier,
                    total: row.total,
                    payment_method: row.payment_method,
                    change_amount: row.change_amount,
                    status: row.status,
                    observations: row.observations,
                    products,
                }
            })
            .collect())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StorageError> {
        let rows = product::Entity::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::Name)
            .all(&self.db)
            .await?;

        rows.into_iter().map(to_product).collect()
    }

    async fn create_product(&self, new_product: &NewProduct) -> Result<String, StorageError> {
        let now = Utc::now();
        let model = product::ActiveModel {
            name: Set(new_product.name.clone()),
            price: Set(new_product.price),
            product_type: Set(new_product.product_type.as_str().to_string()),
            description: Set(new_product.description.clone()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = product::Entity::insert(model).exec(&self.db).await?;
        Ok(result.last_insert_id.to_string())
    }

    async fn record_report(&self, record: &SalesReportRecord) -> Result<(), StorageError> {
        let model = report::ActiveModel {
            report_type: Set(record.report_type.clone()),
            category: Set(Some(record.category.clone())),
            period_start: Set(record.period_start),
            period_end: Set(record.period_end),
            total_sales: Set(record.total_sales),
            total_transactions: Set(record.total_transactions),
            data: Set(Some(record.data.clone())),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        report::Entity::insert(model).exec(&self.db).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "SQLite"
    }
}
