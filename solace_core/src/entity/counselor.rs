use super::labels::Labels;
use crate::booking::WeeklyAvailability;
use crate::ids::CounselorId;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "counselor")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: CounselorId,
    pub name: String,
    pub credentials: String,
    pub specialization: String,
    pub bio: String,
    pub avatar_url: String,
    pub rating: f64,
    pub review_count: i32,
    pub years_experience: i32,
    /// Specialty labels used by the specialization filter.
    pub tags: Labels,
    pub availability: WeeklyAvailability,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::appointment::Entity")]
    Appointment,
}

impl Related<super::appointment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
