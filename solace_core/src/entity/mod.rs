// SeaORM entities backing the document store

pub mod appointment;
pub mod comment;
pub mod comment_like;
pub mod counselor;
pub mod discussion;
pub mod discussion_like;
pub mod identity;
pub mod labels;
pub mod profile;


pub mod prelude {
    pub use super::appointment::{
        ActiveModel as AppointmentActiveModel, AppointmentKind, AppointmentStatus,
        Column as AppointmentColumn, Entity as Appointment, Model as AppointmentModel,
    };
    pub use super::comment::{
        ActiveModel as CommentActiveModel, Column as CommentColumn, Entity as Comment,
        Model as CommentModel,
    };
    pub use super::comment_like::{
        ActiveModel as CommentLikeActiveModel, Column as CommentLikeColumn,
        Entity as CommentLike, Model as CommentLikeModel,
    };
    pub use super::counselor::{
        ActiveModel as CounselorActiveModel, Column as CounselorColumn, Entity as Counselor,
        Model as CounselorModel,
    };
    pub use super::discussion::{
        ActiveModel as DiscussionActiveModel, Column as DiscussionColumn, Entity as Discussion,
        Model as DiscussionModel,
    };
    pub use super::discussion_like::{
        ActiveModel as DiscussionLikeActiveModel, Column as DiscussionLikeColumn,
        Entity as DiscussionLike, Model as DiscussionLikeModel,
    };
    pub use super::identity::{
        ActiveModel as IdentityActiveModel, Column as IdentityColumn, Entity as Identity,
        Model as IdentityModel,
    };
    pub use super::labels::Labels;
    pub use super::profile::{
        ActiveModel as ProfileActiveModel, Column as ProfileColumn, Entity as Profile,
        Model as ProfileModel,
    };

    pub use sea_orm::{
        ActiveModelTrait,
        ActiveValue,

        ColumnTrait,
        ConnectionTrait,

        Database,
        DatabaseConnection,
        DatabaseTransaction,
        DbConn,
        DbErr,

        EntityTrait,
        ModelTrait,
        NotSet,
        PaginatorTrait,
        QueryFilter,
        QueryOrder,
        QuerySelect,
        Set,
        SqlErr,
        TransactionTrait,
    };
}
