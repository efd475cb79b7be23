use sea_orm_migration::prelude::*;

/// Embedded schema migrator. One migration module per table, run on startup
/// when `auto_migrate` is set and by the integration tests against
/// `sqlite::memory:`.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_assets_table::Migration),
            Box::new(m20250101_000003_create_maintenance_history_table::Migration),
            Box::new(m20250101_000004_create_maintenance_points_table::Migration),
            Box::new(m20250101_000005_create_maintenance_point_images_table::Migration),
            Box::new(m20250101_000006_create_parts_table::Migration),
            Box::new(m20250101_000007_create_parts_transactions_table::Migration),
            Box::new(m20250101_000008_create_maintenance_parts_used_table::Migration),
        ]
    }
}

mod m20250101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_users_table"
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
                        .col(
                            ColumnDef::new(Users::Role)
                                .string()
                                .not_null()
                                .default("unspecified"),
                        )
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
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
    pub(super) enum Users {
        Table,
        Id,
        Username,
        PasswordHash,
        Role,
        CreatedAt,
    }
}

mod m20250101_000002_create_assets_table {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000001_create_users_table::Users;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_assets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Assets::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Assets::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Assets::Name).string().not_null())
                        .col(ColumnDef::new(Assets::Location).string().not_null())
                        .col(
                            ColumnDef::new(Assets::CustomData)
                                .text()
                                .not_null()
                                .default("{}"),
                        )
                        .col(ColumnDef::new(Assets::NextPmDate).string().null())
                        .col(ColumnDef::new(Assets::PmFrequencyDays).integer().null())
                        .col(ColumnDef::new(Assets::AssignedTo).integer().null())
                        .col(ColumnDef::new(Assets::ImageFilename).string().null())
                        .col(ColumnDef::new(Assets::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_assets_assigned_to")
                                .from(Assets::Table, Assets::AssignedTo)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assets_next_pm_date")
                        .table(Assets::Table)
                        .col(Assets::NextPmDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Assets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Assets {
        Table,
        Id,
        Name,
        Location,
        CustomData,
        NextPmDate,
        PmFrequencyDays,
        AssignedTo,
        ImageFilename,
        CreatedAt,
    }
}

mod m20250101_000003_create_maintenance_history_table {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000002_create_assets_table::Assets;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_maintenance_history_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaintenanceHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaintenanceHistory::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceHistory::AssetId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceHistory::Description)
                                .text()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MaintenanceHistory::Cost).double().null())
                        .col(
                            ColumnDef::new(MaintenanceHistory::Date)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_maintenance_history_asset_id")
                                .from(MaintenanceHistory::Table, MaintenanceHistory::AssetId)
                                .to(Assets::Table, Assets::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_maintenance_history_asset_id")
                        .table(MaintenanceHistory::Table)
                        .col(MaintenanceHistory::AssetId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaintenanceHistory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MaintenanceHistory {
        Table,
        Id,
        AssetId,
        Description,
        Cost,
        Date,
    }
}

mod m20250101_000004_create_maintenance_points_table {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000001_create_users_table::Users;
    use super::m20250101_000002_create_assets_table::Assets;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_maintenance_points_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaintenancePoints::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaintenancePoints::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePoints::AssetId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePoints::PointName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePoints::Description)
                                .text()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePoints::MaintenanceProcedure)
                                .text()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePoints::FrequencyDays)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePoints::Status)
                                .string()
                                .not_null()
                                .default("active"),
                        )
                        .col(ColumnDef::new(MaintenancePoints::CreatedBy).integer().null())
                        .col(
                            ColumnDef::new(MaintenancePoints::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_maintenance_points_asset_id")
                                .from(MaintenancePoints::Table, MaintenancePoints::AssetId)
                                .to(Assets::Table, Assets::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_maintenance_points_created_by")
                                .from(MaintenancePoints::Table, MaintenancePoints::CreatedBy)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaintenancePoints::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MaintenancePoints {
        Table,
        Id,
        AssetId,
        PointName,
        Description,
        MaintenanceProcedure,
        FrequencyDays,
        Status,
        CreatedBy,
        CreatedAt,
    }
}

mod m20250101_000005_create_maintenance_point_images_table {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000001_create_users_table::Users;
    use super::m20250101_000004_create_maintenance_points_table::MaintenancePoints;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_maintenance_point_images_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaintenancePointImages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaintenancePointImages::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePointImages::MaintenancePointId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePointImages::ImageFilename)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePointImages::ImageDescription)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePointImages::ImageType)
                                .string()
                                .not_null()
                                .default("reference"),
                        )
                        .col(
                            ColumnDef::new(MaintenancePointImages::UploadedBy)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePointImages::UploadDate)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_maintenance_point_images_point_id")
                                .from(
                                    MaintenancePointImages::Table,
                                    MaintenancePointImages::MaintenancePointId,
                                )
                                .to(MaintenancePoints::Table, MaintenancePoints::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_maintenance_point_images_uploaded_by")
                                .from(
                                    MaintenancePointImages::Table,
                                    MaintenancePointImages::UploadedBy,
                                )
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaintenancePointImages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MaintenancePointImages {
        Table,
        Id,
        MaintenancePointId,
        ImageFilename,
        ImageDescription,
        ImageType,
        UploadedBy,
        UploadDate,
    }
}

mod m20250101_000006_create_parts_table {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000001_create_users_table::Users;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_parts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Parts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Parts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Parts::PartNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Parts::PartName).string().not_null())
                        .col(ColumnDef::new(Parts::Description).text().null())
                        .col(ColumnDef::new(Parts::Category).string().null())
                        .col(ColumnDef::new(Parts::Manufacturer).string().null())
                        .col(
                            ColumnDef::new(Parts::UnitPrice)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Parts::MinimumStock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Parts::CurrentStock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Parts::Location).string().null())
                        .col(ColumnDef::new(Parts::Supplier).string().null())
                        .col(ColumnDef::new(Parts::SupplierContact).string().null())
                        .col(ColumnDef::new(Parts::Notes).text().null())
                        .col(ColumnDef::new(Parts::CreatedBy).integer().null())
                        .col(ColumnDef::new(Parts::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Parts::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parts_created_by")
                                .from(Parts::Table, Parts::CreatedBy)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Parts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Parts {
        Table,
        Id,
        PartNumber,
        PartName,
        Description,
        Category,
        Manufacturer,
        UnitPrice,
        MinimumStock,
        CurrentStock,
        Location,
        Supplier,
        SupplierContact,
        Notes,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000007_create_parts_transactions_table {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000001_create_users_table::Users;
    use super::m20250101_000006_create_parts_table::Parts;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000007_create_parts_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PartsTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PartsTransactions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PartsTransactions::PartId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PartsTransactions::TransactionType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PartsTransactions::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PartsTransactions::ReferenceType)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PartsTransactions::ReferenceId)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(PartsTransactions::UnitCost).double().null())
                        .col(ColumnDef::new(PartsTransactions::Notes).text().null())
                        .col(
                            ColumnDef::new(PartsTransactions::TransactionDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PartsTransactions::CreatedBy)
                                .integer()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parts_transactions_part_id")
                                .from(PartsTransactions::Table, PartsTransactions::PartId)
                                .to(Parts::Table, Parts::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parts_transactions_created_by")
                                .from(PartsTransactions::Table, PartsTransactions::CreatedBy)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_parts_transactions_part_id")
                        .table(PartsTransactions::Table)
                        .col(PartsTransactions::PartId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PartsTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PartsTransactions {
        Table,
        Id,
        PartId,
        TransactionType,
        Quantity,
        ReferenceType,
        ReferenceId,
        UnitCost,
        Notes,
        TransactionDate,
        CreatedBy,
    }
}

mod m20250101_000008_create_maintenance_parts_used_table {
    use sea_orm_migration::prelude::*;

    use super::m20250101_000003_create_maintenance_history_table::MaintenanceHistory;
    use super::m20250101_000006_create_parts_table::Parts;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000008_create_maintenance_parts_used_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaintenancePartsUsed::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaintenancePartsUsed::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePartsUsed::MaintenanceHistoryId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePartsUsed::PartId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePartsUsed::QuantityUsed)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenancePartsUsed::UnitCost)
                                .double()
                                .null(),
                        )
                        .col(ColumnDef::new(MaintenancePartsUsed::Notes).text().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_maintenance_parts_used_history_id")
                                .from(
                                    MaintenancePartsUsed::Table,
                                    MaintenancePartsUsed::MaintenanceHistoryId,
                                )
                                .to(MaintenanceHistory::Table, MaintenanceHistory::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_maintenance_parts_used_part_id")
                                .from(MaintenancePartsUsed::Table, MaintenancePartsUsed::PartId)
                                .to(Parts::Table, Parts::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaintenancePartsUsed::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MaintenancePartsUsed {
        Table,
        Id,
        MaintenanceHistoryId,
        PartId,
        QuantityUsed,
        UnitCost,
        Notes,
    }
}
