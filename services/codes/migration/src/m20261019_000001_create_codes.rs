use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Codes::Table)
                    .if_not_exists()
                    // INTEGER PRIMARY KEY AUTOINCREMENT: ids are never reused, even after a clear.
                    .col(
                        ColumnDef::new(Codes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Codes::Value).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Codes::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Codes::UploadedBy).big_integer().not_null())
                    .col(
                        ColumnDef::new(Codes::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Codes::UsedBy).big_integer())
                    .col(ColumnDef::new(Codes::UsedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Codes::Table)
                    .col(Codes::IsUsed)
                    .col(Codes::Id)
                    .name("idx_codes_is_used_id")
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Codes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Codes {
    Table,
    Id,
    Value,
    IsUsed,
    UploadedBy,
    UploadedAt,
    UsedBy,
    UsedAt,
}
