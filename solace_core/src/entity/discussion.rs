use super::labels::Labels;
use crate::ids::{DiscussionId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "discussion")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: DiscussionId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Labels,
    /// Content-warning labels.
    pub triggers: Labels,
    pub author_id: UserId,
    pub author_display_name: String,
    pub author_profile_pic_url: String,
    pub created_at: String,
    pub replies: i64,
    pub likes: i64,
    pub views: i64,
    pub is_pinned: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::AuthorId",
        to = "super::profile::Column::Id"
    )]
    Author,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
