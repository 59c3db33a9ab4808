use iroh::{PublicKey, SecretKey};
use std::path::PathBuf;

use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use crate::{
    crypto::PiiCipher, entity::prelude::*, ids::UserId, models::migrator::Migrator,
    session::Session, timestamps,
};

/// Fresh in-memory database with every migration applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Migrated database in a scratch file, pooled over several connections so
/// concurrent writers contend for the SQLite write lock.
pub async fn setup_file_db() -> (DatabaseConnection, PathBuf) {
    let path = std::env::temp_dir().join(format!("solace-test-{}.sqlite", uuid::Uuid::now_v7()));

    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options.min_connections(4).max_connections(4);
    let db = Database::connect(options)
        .await
        .expect("Failed to create file database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    (db, path)
}

pub fn cipher() -> PiiCipher {
    PiiCipher::new([7u8; 32])
}

pub fn node_key() -> PublicKey {
    SecretKey::generate(&mut rand::rng()).public()
}

/// Insert a bare profile and return a session for it.
pub async fn create_test_profile(
    db: &DatabaseConnection,
    email: &str,
    display_name: Option<&str>,
) -> Session {
    let user_id = UserId::new();
    let now = timestamps::now();

    let profile = ProfileActiveModel {
        id: Set(user_id),
        email: Set(email.to_string()),
        display_name: Set(display_name.map(str::to_string)),
        phone: Set(None),
        age: Set(None),
        triggers: Set(Labels::default()),
        bio: Set(String::new()),
        preferences: Set(String::new()),
        profile_image_url: Set(None),
        setup_completed: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    };
    let model = profile.insert(db).await.expect("Failed to insert profile");

    Session::from_profile(&model)
}
