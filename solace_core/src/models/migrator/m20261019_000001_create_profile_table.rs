use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .col(pk_uuid(Profile::Id))
                    .col(string_uniq(Profile::Email))
                    .col(string_null(Profile::DisplayName))
                    .col(string_null(Profile::Phone))
                    .col(string_null(Profile::Age))
                    .col(json(Profile::Triggers))
                    .col(string(Profile::Bio))
                    .col(string(Profile::Preferences))
                    .col(string_null(Profile::ProfileImageUrl))
                    .col(boolean(Profile::SetupCompleted))
                    .col(string(Profile::CreatedAt))
                    .col(string(Profile::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Profile {
    Table,
    Id,
    Email,
    DisplayName,
    Phone,
    Age,
    Triggers,
    Bio,
    Preferences,
    ProfileImageUrl,
    SetupCompleted,
    CreatedAt,
    UpdatedAt,
}
