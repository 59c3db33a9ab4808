use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_profile_table::Profile;
use super::m20261019_000006_create_counselor_table::Counselor;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointment::Table)
                    .col(pk_uuid(Appointment::Id))
                    .col(uuid(Appointment::CounselorId))
                    .col(string(Appointment::CounselorName))
                    .col(uuid(Appointment::UserId))
                    .col(string(Appointment::UserName))
                    .col(string(Appointment::UserEmail))
                    .col(string(Appointment::Date))
                    .col(string(Appointment::Time))
                    .col(integer(Appointment::DurationMinutes))
                    .col(string(Appointment::Kind))
                    .col(string(Appointment::Status))
                    .col(text_null(Appointment::Notes))
                    .col(string(Appointment::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-appointment-counselor_id")
                            .from(Appointment::Table, Appointment::CounselorId)
                            .to(Counselor::Table, Counselor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-appointment-user_id")
                            .from(Appointment::Table, Appointment::UserId)
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
                    .name("idx_appointment_user_id")
                    .table(Appointment::Table)
                    .col(Appointment::UserId)
                    .to_owned(),
            )
            .await?;

        // At most one scheduled appointment per counselor slot. Cancelled rows
        // fall out of the index so the slot can be booked again.
        manager
            .get_connection()
            .execute_unprepared(
                r#"CREATE UNIQUE INDEX "idx_appointment_scheduled_slot"
                   ON "appointment" ("counselor_id", "date", "time")
                   WHERE "status" = 'scheduled'"#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Appointment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Appointment {
    Table,
    Id,
    CounselorId,
    CounselorName,
    UserId,
    UserName,
    UserEmail,
    Date,
    Time,
    DurationMinutes,
    Kind,
    Status,
    Notes,
    CreatedAt,
}
