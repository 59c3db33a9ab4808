use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_profile_table::Profile;
use super::m20261019_000003_create_discussion_table::Discussion;
use super::m20261019_000004_create_comment_table::Comment;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscussionLike::Table)
                    .col(uuid(DiscussionLike::UserId))
                    .col(uuid(DiscussionLike::DiscussionId))
                    .col(string(DiscussionLike::CreatedAt))
                    .primary_key(
                        Index::create()
                            .col(DiscussionLike::UserId)
                            .col(DiscussionLike::DiscussionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-discussion_like-user_id")
                            .from(DiscussionLike::Table, DiscussionLike::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-discussion_like-discussion_id")
                            .from(DiscussionLike::Table, DiscussionLike::DiscussionId)
                            .to(Discussion::Table, Discussion::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CommentLike::Table)
                    .col(uuid(CommentLike::UserId))
                    .col(uuid(CommentLike::CommentId))
                    .col(string(CommentLike::CreatedAt))
                    .primary_key(
                        Index::create()
                            .col(CommentLike::UserId)
                            .col(CommentLike::CommentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comment_like-user_id")
                            .from(CommentLike::Table, CommentLike::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comment_like-comment_id")
                            .from(CommentLike::Table, CommentLike::CommentId)
                            .to(Comment::Table, Comment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CommentLike::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DiscussionLike::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DiscussionLike {
    Table,
    UserId,
    DiscussionId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum CommentLike {
    Table,
    UserId,
    CommentId,
    CreatedAt,
}
