use std::time::Duration;

use anyhow::Result;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use stagedoor_common::helpers::fs::{secure_directory, secure_file};
use stagedoor_common::{StagedoorConfig, StagedoorError};
use stagedoor_db_entities::TeaserSession;
use stagedoor_db_migrations::migrate_database;
use tracing::*;

pub async fn connect_to_db(config: &StagedoorConfig) -> Result<DatabaseConnection> {
    let mut url = url::Url::parse(&config.store.database_url.expose_secret()[..])?;
    if url.scheme() == "sqlite" {
        let path = url.path();
        let mut abs_path = config.paths_relative_to.clone();
        abs_path.push(path);
        abs_path.push("db.sqlite3");

        if let Some(parent) = abs_path.parent() {
            std::fs::create_dir_all(parent)?;
            secure_directory(parent)?;
        }

        url.set_path(
            abs_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Failed to convert database path to string"))?,
        );

        url.set_query(Some("mode=rwc"));

        let db = Database::connect(ConnectOptions::new(url.to_string())).await?;
        db.begin().await?.commit().await?;
        drop(db);

        secure_file(&abs_path)?;
    }

    let mut opt = ConnectOptions::new(url.to_string());
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);

    let connection = Database::connect(opt).await?;

    migrate_database(&connection).await?;
    Ok(connection)
}

/// Settles state left over from a previous run: teaser sessions whose
/// window lapsed while the service was down are deactivated in bulk.
pub async fn populate_db(db: &mut DatabaseConnection) -> Result<(), StagedoorError> {
    let result = TeaserSession::Entity::update_many()
        .set(TeaserSession::ActiveModel {
            active: Set(false),
            ..Default::default()
        })
        .filter(TeaserSession::Column::Active.eq(true))
        .filter(TeaserSession::Column::Expires.lte(chrono::Utc::now()))
        .exec(db)
        .await
        .map_err(StagedoorError::from)?;

    if result.rows_affected > 0 {
        info!(
            sessions = result.rows_affected,
            "Deactivated stale teaser sessions"
        );
    }

    Ok(())
}

/// Deletes deactivated teaser sessions past the retention window.
pub async fn cleanup_db(db: &mut DatabaseConnection, retention: &Duration) -> Result<()> {
    let cutoff = chrono::Utc::now() - chrono::Duration::from_std(*retention)?;

    TeaserSession::Entity::delete_many()
        .filter(TeaserSession::Column::Active.eq(false))
        .filter(TeaserSession::Column::Expires.lt(cutoff))
        .exec(db)
        .await?;

    Ok(())
}
