use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Codes::Table)
                    .col(Codes::UsedBy)
                    .name("idx_codes_used_by")
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Codes::Table)
                    .col(Codes::UsedAt)
                    .name("idx_codes_used_at")
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_codes_used_at").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_codes_used_by").to_owned())
            .await
    }
}

#[derive(Iden)]
enum Codes {
    Table,
    UsedBy,
    UsedAt,
}
