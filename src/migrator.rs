use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_cash_control_table::Migration),
            Box::new(m20240101_000003_create_sales_table::Migration),
            Box::new(m20240101_000004_create_sale_items_table::Migration),
            Box::new(m20240101_000005_create_products_table::Migration),
            Box::new(m20240101_000006_create_reports_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_users_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(ColumnDef::new(Users::Category).string().not_null())
                        .col(
                            ColumnDef::new(Users::Permissions)
                                .string()
                                .not_null()
                                .default("[]"),
                        )
                        .col(ColumnDef::new(Users::LastLogin).timestamp().null())
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Username,
        PasswordHash,
        Name,
        Role,
        Category,
        Permissions,
        LastLogin,
        CreatedAt,
        IsActive,
    }
}

mod m20240101_000002_create_cash_control_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_cash_control_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CashControl::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CashControl::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(CashControl::Category)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(CashControl::IsOpen)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CashControl::InitialCash)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashControl::CurrentBalance)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CashControl::TodaySales)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(CashControl::LastOpened).timestamp().null())
                        .col(ColumnDef::new(CashControl::LastClosed).timestamp().null())
                        .col(ColumnDef::new(CashControl::Observations).string().null())
                        .col(
                            ColumnDef::new(CashControl::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CashControl::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CashControl {
        Table,
        Id,
        Category,
        IsOpen,
        InitialCash,
        CurrentBalance,
        TodaySales,
        LastOpened,
        LastClosed,
        Observations,
        CreatedAt,
    }
}

mod m20240101_000003_create_sales_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_sales_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Sales::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Sales::SaleId)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Sales::Timestamp).timestamp().not_null())
                        .col(ColumnDef::new(Sales::Category).string().not_null())
                        .col(ColumnDef::new(Sales::Cashier).string().not_null())
                        .col(ColumnDef::new(Sales::Total).double().not_null())
                        .col(ColumnDef::new(Sales::PaymentMethod).string().not_null())
                        .col(
                            ColumnDef::new(Sales::ChangeAmount)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Sales::Status)
                                .string()
                                .not_null()
                                .default("completed"),
                        )
                        .col(
                            ColumnDef::new(Sales::Observations)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Sales::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            // Sales are always listed per category filtered by time range
            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_category_timestamp")
                        .table(Sales::Table)
                        .col(Sales::Category)
                        .col(Sales::Timestamp)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Sales::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Sales {
        Table,
        Id,
        SaleId,
        Timestamp,
        Category,
        Cashier,
        Total,
        PaymentMethod,
        ChangeAmount,
        Status,
        Observations,
        CreatedAt,
    }
}

mod m20240101_000004_create_sale_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_sale_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SaleItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SaleItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SaleItems::SaleId).string().not_null())
                        .col(ColumnDef::new(SaleItems::CustomerName).string().not_null())
                        .col(
                            ColumnDef::new(SaleItems::CustomerDocument)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SaleItems::ProductName).string().not_null())
                        .col(ColumnDef::new(SaleItems::ProductId).string().null())
                        .col(ColumnDef::new(SaleItems::Quantity).big_integer().not_null())
                        .col(ColumnDef::new(SaleItems::UnitPrice).double().not_null())
                        .col(ColumnDef::new(SaleItems::Total).double().not_null())
                        .col(ColumnDef::new(SaleItems::Type).string().not_null())
                        .col(
                            ColumnDef::new(SaleItems::Observations)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(SaleItems::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sale_items_sale_id")
                                .from(SaleItems::Table, SaleItems::SaleId)
                                .to(Sales::Table, Sales::SaleId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sale_items_sale_id")
                        .table(SaleItems::Table)
                        .col(SaleItems::SaleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SaleItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SaleItems {
        Table,
        Id,
        SaleId,
        CustomerName,
        CustomerDocument,
        ProductName,
        ProductId,
        Quantity,
        UnitPrice,
        Total,
        Type,
        Observations,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Sales {
        Table,
        SaleId,
    }
}

mod m20240101_000005_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Price).double().not_null())
                        .col(ColumnDef::new(Products::Type).string().not_null())
                        .col(
                            ColumnDef::new(Products::Description)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Price,
        Type,
        Description,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_reports_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_reports_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reports::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Reports::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Reports::ReportType).string().not_null())
                        .col(ColumnDef::new(Reports::Category).string().null())
                        .col(ColumnDef::new(Reports::PeriodStart).timestamp().null())
                        .col(ColumnDef::new(Reports::PeriodEnd).timestamp().null())
                        .col(
                            ColumnDef::new(Reports::TotalSales)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Reports::TotalTransactions)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Reports::Data).string().null())
                        .col(ColumnDef::new(Reports::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reports::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Reports {
        Table,
        Id,
        ReportType,
        Category,
        PeriodStart,
        PeriodEnd,
        TotalSales,
        TotalTransactions,
        Data,
        CreatedAt,
    }
}
