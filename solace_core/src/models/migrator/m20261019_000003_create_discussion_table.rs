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
                    .table(Discussion::Table)
                    .col(pk_uuid(Discussion::Id))
                    .col(string(Discussion::Title))
                    .col(text(Discussion::Content))
                    .col(string(Discussion::Category))
                    .col(json(Discussion::Tags))
                    .col(json(Discussion::Triggers))
                    .col(uuid(Discussion::AuthorId))
                    .col(string(Discussion::AuthorDisplayName))
                    .col(string(Discussion::AuthorProfilePicUrl))
                    .col(string(Discussion::CreatedAt))
                    .col(big_integer(Discussion::Replies).default(0))
                    .col(big_integer(Discussion::Likes).default(0))
                    .col(big_integer(Discussion::Views).default(0))
                    .col(boolean(Discussion::IsPinned).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-discussion-author_id")
                            .from(Discussion::Table, Discussion::AuthorId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_discussion_created_at")
                    .table(Discussion::Table)
                    .col(Discussion::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Discussion::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Discussion {
    Table,
    Id,
    Title,
    Content,
    Category,
    Tags,
    Triggers,
    AuthorId,
    AuthorDisplayName,
    AuthorProfilePicUrl,
    CreatedAt,
    Replies,
    Likes,
    Views,
    IsPinned,
}
