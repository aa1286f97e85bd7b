use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ratings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Ratings::UserId).uuid().not_null())
                    .col(ColumnDef::new(Ratings::ServiceId).uuid().not_null())
                    .col(
                        ColumnDef::new(Ratings::Score)
                            .integer()
                            .not_null()
                            .check(Expr::col(Ratings::Score).between(1, 5)),
                    )
                    .col(
                        ColumnDef::new(Ratings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Ratings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One rating per (user, service); the upsert relies on this index as its conflict target.
        manager
            .create_index(
                Index::create()
                    .name("uq_ratings_user_service")
                    .table(Ratings::Table)
                    .col(Ratings::UserId)
                    .col(Ratings::ServiceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_service_created_at")
                    .table(Ratings::Table)
                    .col(Ratings::ServiceId)
                    .col(Ratings::CreatedAt)
                    .to_owned(),
            )
            .await
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
    UserId,
    ServiceId,
    Score,
    CreatedAt,
    UpdatedAt,
}
