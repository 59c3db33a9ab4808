use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Counselor::Table)
                    .col(pk_uuid(Counselor::Id))
                    .col(string(Counselor::Name))
                    .col(string(Counselor::Credentials))
                    .col(string(Counselor::Specialization))
                    .col(text(Counselor::Bio))
                    .col(string(Counselor::AvatarUrl))
                    .col(double(Counselor::Rating))
                    .col(integer(Counselor::ReviewCount))
                    .col(integer(Counselor::YearsExperience))
                    .col(json(Counselor::Tags))
                    .col(json(Counselor::Availability))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Counselor::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Counselor {
    Table,
    Id,
    Name,
    Credentials,
    Specialization,
    Bio,
    AvatarUrl,
    Rating,
    ReviewCount,
    YearsExperience,
    Tags,
    Availability,
}
