use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_suppliers_table::Migration),
            Box::new(m20240101_000003_create_inventory_items_table::Migration),
            Box::new(m20240101_000004_create_orders_tables::Migration),
            Box::new(m20240101_000005_create_ratings_table::Migration),
            Box::new(m20240101_000006_create_credit_transactions_table::Migration),
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
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Phone).string().not_null())
                        .col(ColumnDef::new(Users::Address).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Close the check-then-insert race on duplicate registrations
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_phone")
                        .table(Users::Table)
                        .col(Users::Phone)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
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
        Name,
        Phone,
        Address,
        PasswordHash,
        Role,
        CreatedAt,
    }
}

mod m20240101_000002_create_suppliers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_suppliers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(ColumnDef::new(Suppliers::Address).string().not_null())
                        .col(ColumnDef::new(Suppliers::Phone).string().not_null())
                        .col(
                            ColumnDef::new(Suppliers::Rating)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Suppliers::TotalReviews)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Suppliers::DistanceKm).double().not_null())
                        .col(
                            ColumnDef::new(Suppliers::DeliveryTimeMinutes)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
        Name,
        Address,
        Phone,
        Rating,
        TotalReviews,
        DistanceKm,
        DeliveryTimeMinutes,
        CreatedAt,
    }
}

mod m20240101_000003_create_inventory_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::SupplierId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::Name).string().not_null())
                        .col(ColumnDef::new(InventoryItems::Unit).string().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::Price)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::Description)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_items_supplier_id")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::SupplierId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryItems {
        Table,
        Id,
        SupplierId,
        Name,
        Unit,
        Price,
        Quantity,
        Description,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_orders_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Vendor-side copy
            manager
                .create_table(order_table(Orders::Table))
                .await?;

            // Supplier-side mirror, same shape and shared ids
            manager
                .create_table(order_table(IncomingOrders::Table))
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_vendor_id")
                        .table(Orders::Table)
                        .col(Orders::VendorId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_incoming_orders_supplier_id")
                        .table(IncomingOrders::Table)
                        .col(Orders::SupplierId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_incoming_orders_status")
                        .table(IncomingOrders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(IncomingOrders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    fn order_table<T: IntoTableRef>(table: T) -> TableCreateStatement {
        Table::create()
            .table(table)
            .if_not_exists()
            .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
            .col(ColumnDef::new(Orders::VendorId).uuid().not_null())
            .col(ColumnDef::new(Orders::SupplierId).uuid().not_null())
            .col(ColumnDef::new(Orders::VendorName).string().not_null())
            .col(ColumnDef::new(Orders::VendorAddress).string().not_null())
            .col(ColumnDef::new(Orders::SupplierName).string().not_null())
            .col(ColumnDef::new(Orders::SupplierPhone).string().not_null())
            .col(ColumnDef::new(Orders::Items).json().not_null())
            .col(ColumnDef::new(Orders::Total).decimal_len(12, 2).not_null())
            .col(
                ColumnDef::new(Orders::DeliveryFee)
                    .decimal_len(12, 2)
                    .not_null()
                    .default(0),
            )
            .col(ColumnDef::new(Orders::PaymentMethod).string().not_null())
            .col(
                ColumnDef::new(Orders::SpecialNotes)
                    .string()
                    .not_null()
                    .default(""),
            )
            .col(ColumnDef::new(Orders::Status).string().not_null())
            .col(
                ColumnDef::new(Orders::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Orders::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned()
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        VendorId,
        SupplierId,
        VendorName,
        VendorAddress,
        SupplierName,
        SupplierPhone,
        Items,
        Total,
        DeliveryFee,
        PaymentMethod,
        SpecialNotes,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum IncomingOrders {
        Table,
    }
}

mod m20240101_000005_create_ratings_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_ratings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Ratings::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Ratings::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Ratings::VendorId).uuid().not_null())
                        .col(ColumnDef::new(Ratings::VendorName).string().not_null())
                        .col(ColumnDef::new(Ratings::SupplierId).uuid().not_null())
                        .col(ColumnDef::new(Ratings::OrderId).uuid().not_null())
                        .col(ColumnDef::new(Ratings::OverallRating).integer().not_null())
                        .col(ColumnDef::new(Ratings::Quality).integer().not_null())
                        .col(ColumnDef::new(Ratings::Delivery).integer().not_null())
                        .col(ColumnDef::new(Ratings::Communication).integer().not_null())
                        .col(
                            ColumnDef::new(Ratings::ReviewText)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Ratings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ratings_supplier_id")
                        .table(Ratings::Table)
                        .col(Ratings::SupplierId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Ratings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Ratings {
        Table,
        Id,
        VendorId,
        VendorName,
        SupplierId,
        OrderId,
        OverallRating,
        Quality,
        Delivery,
        Communication,
        ReviewText,
        CreatedAt,
    }
}

mod m20240101_000006_create_credit_transactions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_credit_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CreditTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CreditTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::VendorId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::OrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::SupplierId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::SupplierName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::Amount)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CreditTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_credit_transactions_vendor_id")
                        .table(CreditTransactions::Table)
                        .col(CreditTransactions::VendorId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CreditTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CreditTransactions {
        Table,
        Id,
        VendorId,
        OrderId,
        SupplierId,
        SupplierName,
        Amount,
        Status,
        CreatedAt,
    }
}
