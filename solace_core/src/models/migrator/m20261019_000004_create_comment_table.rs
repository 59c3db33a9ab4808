use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_profile_table::Profile;
use super::m20261019_000003_create_discussion_table::Discussion;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .col(pk_uuid(Comment::Id))
                    .col(uuid(Comment::DiscussionId))
                    .col(uuid_null(Comment::ParentId)) // For nested replies
                    .col(string_uniq(Comment::Path))
                    .col(uuid(Comment::AuthorId))
                    .col(string(Comment::AuthorDisplayName))
                    .col(string(Comment::AuthorProfilePicUrl))
                    .col(text(Comment::Content))
                    .col(string(Comment::CreatedAt))
                    .col(big_integer(Comment::Likes).default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comment-discussion_id")
                            .from(Comment::Table, Comment::DiscussionId)
                            .to(Discussion::Table, Discussion::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comment-parent_id")
                            .from(Comment::Table, Comment::ParentId)
                            .to(Comment::Table, Comment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comment-author_id")
                            .from(Comment::Table, Comment::AuthorId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Whole-thread loads filter on discussion_id
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_discussion_id")
                    .table(Comment::Table)
                    .col(Comment::DiscussionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_parent_id")
                    .table(Comment::Table)
                    .col(Comment::ParentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Comment {
    Table,
    Id,
    DiscussionId,
    ParentId,
    Path,
    AuthorId,
    AuthorDisplayName,
    AuthorProfilePicUrl,
    Content,
    CreatedAt,
    Likes,
}
