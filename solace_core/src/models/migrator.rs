use sea_orm_migration::prelude::*;

mod m20261019_000001_create_profile_table;
mod m20261019_000002_create_identity_table;
mod m20261019_000003_create_discussion_table;
mod m20261019_000004_create_comment_table;
mod m20261019_000005_create_like_tables;
mod m20261019_000006_create_counselor_table;
mod m20261019_000007_create_appointment_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_profile_table::Migration),
            Box::new(m20261019_000002_create_identity_table::Migration),
            Box::new(m20261019_000003_create_discussion_table::Migration),
            Box::new(m20261019_000004_create_comment_table::Migration),
            Box::new(m20261019_000005_create_like_tables::Migration),
            Box::new(m20261019_000006_create_counselor_table::Migration),
            Box::new(m20261019_000007_create_appointment_table::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{Database, DbErr};

    #[tokio::test]
    async fn test_migrations_okay() -> Result<(), DbErr> {
        let db = Database::connect("sqlite::memory:").await?;
        let schema_manager = SchemaManager::new(&db);

        Migrator::refresh(&db).await?;

        for table in [
            "profile",
            "identity",
            "discussion",
            "comment",
            "discussion_like",
            "comment_like",
            "counselor",
            "appointment",
        ] {
            assert!(schema_manager.has_table(table).await?, "missing {table}");
        }
        assert!(
            schema_manager
                .has_index("appointment", "idx_appointment_scheduled_slot")
                .await?
        );

        Ok(())
    }
}
