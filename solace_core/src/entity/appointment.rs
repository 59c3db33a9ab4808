use crate::ids::{AppointmentId, CounselorId, UserId};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentKind {
    #[sea_orm(string_value = "online")]
    Online,
    #[sea_orm(string_value = "in-person")]
    InPerson,
}

/// `Completed` is representable but nothing transitions into it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appointment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: AppointmentId,
    pub counselor_id: CounselorId,
    pub counselor_name: String,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Matches one entry of the counselor's weekly template.
    pub time: String,
    pub duration_minutes: i32,
    pub kind: AppointmentKind,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::counselor::Entity",
        from = "Column::CounselorId",
        to = "super::counselor::Column::Id"
    )]
    Counselor,
}

impl Related<super::counselor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Counselor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
