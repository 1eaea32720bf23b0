use std::sync::Arc;

use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection};
use stagedoor_db_entities::{Profile, TeaserConfig};
use tokio::sync::Mutex;
use uuid::Uuid;

#[allow(clippy::unwrap_used)]
pub(crate) async fn connect_test_db() -> DatabaseConnection {
    // A single pooled connection, so every query sees the same in-memory db
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    stagedoor_db_migrations::migrate_database(&db).await.unwrap();
    db
}

#[allow(clippy::unwrap_used)]
pub(crate) async fn create_profile(db: &Arc<Mutex<DatabaseConnection>>) -> Uuid {
    let db = db.lock().await;
    let profile = Profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("test profile".into()),
        description: Set("".into()),
        created: Set(chrono::Utc::now()),
    }
    .insert(&*db)
    .await
    .unwrap();
    profile.id
}

pub(crate) fn teaser_config(
    profile_id: Uuid,
    enabled: bool,
    duration_seconds: i32,
) -> TeaserConfig::Model {
    TeaserConfig::Model {
        id: Uuid::new_v4(),
        profile_id,
        enabled,
        duration_seconds,
        expired_message: TeaserConfig::DEFAULT_EXPIRED_MESSAGE.to_owned(),
    }
}
