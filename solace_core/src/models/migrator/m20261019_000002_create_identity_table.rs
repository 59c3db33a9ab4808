use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_profile_table::Profile;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Identity::Table)
                    .col(binary(Identity::NodeId))
                    .col(uuid(Identity::UserId))
                    .primary_key(
                        Index::create()
                            .col(Identity::NodeId)
                            .col(Identity::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-identity-user_id")
                            .from(Identity::Table, Identity::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A transport key resolves to at most one user
        manager
            .create_index(
                Index::create()
                    .name("idx_identity_node_id")
                    .table(Identity::Table)
                    .col(Identity::NodeId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Identity::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Identity {
    Table,
    NodeId,
    UserId,
}
