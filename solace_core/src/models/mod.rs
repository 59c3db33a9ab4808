use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::config::SolaceConfig;

pub mod migrator;

pub async fn open_or_create_db(config: &SolaceConfig) -> Result<DatabaseConnection, DbErr> {
    Database::connect(config.database_url()).await
}

pub async fn migrate_up(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await
}
