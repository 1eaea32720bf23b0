use std::sync::Arc;

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use stagedoor_common::{ProfileId, StagedoorError};
use stagedoor_db_entities::TeaserConfig;
use stagedoor_db_entities::TeaserSession::{self, viewer_key};
use tokio::sync::Mutex;
use tracing::*;
use uuid::Uuid;

use crate::consts::{TEASER_DURATION_MAX_SECONDS, TEASER_DURATION_MIN_SECONDS};
use crate::TeaserStatus;

pub fn validate_teaser_duration(seconds: i32) -> Result<(), StagedoorError> {
    if !(TEASER_DURATION_MIN_SECONDS..=TEASER_DURATION_MAX_SECONDS).contains(&seconds) {
        return Err(StagedoorError::InvalidTeaserDuration(seconds));
    }
    Ok(())
}

/// Owns the lifecycle of teaser preview sessions. Sessions are keyed by
/// (profile, viewer key); at most one is active per key at a time.
pub struct TeaserSessionManager {
    db: Arc<Mutex<DatabaseConnection>>,
}

impl TeaserSessionManager {
    pub fn new(db: &Arc<Mutex<DatabaseConnection>>) -> Self {
        Self { db: db.clone() }
    }

    /// Returns the session governing this viewer's preview window, creating
    /// one on first request. Returns `None` when the profile has teasers
    /// disabled.
    ///
    /// A viewer re-requesting within their window gets the same session back
    /// with the clock untouched. Once the window has lapsed, the lapsed
    /// session itself is returned (deactivated) so the caller can tell
    /// "used up" apart from "never started" - an expired key never earns a
    /// fresh window.
    ///
    /// The lookup and insert run inside one transaction, with an exclusive
    /// row lock on backends that support it, so concurrent first requests
    /// for the same key settle on a single session.
    pub async fn get_or_create(
        &self,
        profile_id: ProfileId,
        viewer_id: Option<Uuid>,
        viewer_ip: &str,
        config: &TeaserConfig::Model,
    ) -> Result<Option<TeaserSession::Model>, StagedoorError> {
        if !config.enabled {
            return Ok(None);
        }

        let key = viewer_key(viewer_id, viewer_ip);
        let db = self.db.lock().await;
        let txn = db.begin().await?;
        let now = Utc::now();

        let existing = TeaserSession::Entity::find()
            .filter(TeaserSession::Column::ProfileId.eq(profile_id))
            .filter(TeaserSession::Column::ViewerKey.eq(&key))
            .order_by_desc(TeaserSession::Column::Started)
            .lock_exclusive()
            .one(&txn)
            .await?;

        let session = match existing {
            Some(session) if !session.is_expired(now) => session,
            Some(session) => {
                let session = if session.active {
                    let mut model: TeaserSession::ActiveModel = session.into();
                    model.active = Set(false);
                    model.update(&txn).await?
                } else {
                    session
                };
                txn.commit().await?;
                debug!(%profile_id, viewer_key = %key, "Teaser window already used up");
                return Ok(Some(session));
            }
            None => {
                let expires = now + chrono::Duration::seconds(config.duration_seconds as i64);
                let session = TeaserSession::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    profile_id: Set(profile_id),
                    viewer_id: Set(viewer_id),
                    viewer_ip: Set(viewer_ip.to_owned()),
                    viewer_key: Set(key.clone()),
                    started: Set(now),
                    expires: Set(expires),
                    active: Set(true),
                }
                .insert(&txn)
                .await?;
                info!(%profile_id, viewer_key = %key, %expires, "Teaser session started");
                session
            }
        };

        txn.commit().await?;
        Ok(Some(session))
    }

    /// Read-only probe of a viewer's preview window. An expired session that
    /// is still flagged active is deactivated on the way out.
    pub async fn status(
        &self,
        profile_id: ProfileId,
        viewer_id: Option<Uuid>,
        viewer_ip: &str,
        config: &TeaserConfig::Model,
    ) -> Result<TeaserStatus, StagedoorError> {
        let key = viewer_key(viewer_id, viewer_ip);
        let db = self.db.lock().await;
        let now = Utc::now();

        let existing = TeaserSession::Entity::find()
            .filter(TeaserSession::Column::ProfileId.eq(profile_id))
            .filter(TeaserSession::Column::ViewerKey.eq(&key))
            .order_by_desc(TeaserSession::Column::Started)
            .one(&*db)
            .await?;

        if let Some(session) = existing {
            if session.active && !session.is_expired(now) {
                return Ok(TeaserStatus {
                    active: true,
                    remaining_seconds: Some((session.expires - now).num_seconds()),
                    expires_at: Some(session.expires),
                    message: config.expired_message.clone(),
                });
            }
            if session.active {
                let mut model: TeaserSession::ActiveModel = session.into();
                model.active = Set(false);
                model.update(&*db).await?;
                debug!(%profile_id, viewer_key = %key, "Teaser session lazily deactivated");
            }
        }

        Ok(TeaserStatus {
            active: false,
            remaining_seconds: None,
            expires_at: None,
            message: config.expired_message.clone(),
        })
    }

    /// Bulk-deactivates lapsed sessions. Purely storage hygiene: expiry is
    /// also applied lazily on every read, so skipping a sweep is harmless.
    pub async fn deactivate_expired(&self) -> Result<u64, StagedoorError> {
        let db = self.db.lock().await;
        let result = TeaserSession::Entity::update_many()
            .set(TeaserSession::ActiveModel {
                active: Set(false),
                ..Default::default()
            })
            .filter(TeaserSession::Column::Active.eq(true))
            .filter(TeaserSession::Column::Expires.lte(Utc::now()))
            .exec(&*db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sea_orm::IntoActiveModel;
    use tokio::sync::Mutex;

    use super::*;
    use crate::test_support::{connect_test_db, create_profile, teaser_config};

    async fn force_expiry(db: &Arc<Mutex<DatabaseConnection>>, session_id: Uuid) {
        let db = db.lock().await;
        let session = TeaserSession::Entity::find_by_id(session_id)
            .one(&*db)
            .await
            .unwrap()
            .unwrap();
        let mut model = session.into_active_model();
        model.expires = Set(Utc::now() - chrono::Duration::seconds(1));
        model.update(&*db).await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_teaser_yields_no_session() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let manager = TeaserSessionManager::new(&db);

        let config = teaser_config(profile_id, false, 30);
        let session = manager
            .get_or_create(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent_within_window() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let manager = TeaserSessionManager::new(&db);
        let config = teaser_config(profile_id, true, 30);

        let first = manager
            .get_or_create(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap()
            .unwrap();
        let second = manager
            .get_or_create(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.expires, second.expires);
        assert!(second.active);
    }

    #[tokio::test]
    async fn test_sessions_are_keyed_per_viewer() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let manager = TeaserSessionManager::new(&db);
        let config = teaser_config(profile_id, true, 30);

        let anonymous = manager
            .get_or_create(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap()
            .unwrap();
        let authenticated = manager
            .get_or_create(profile_id, Some(Uuid::new_v4()), "192.0.2.1", &config)
            .await
            .unwrap()
            .unwrap();

        // Same IP, but the authenticated viewer keys by their user id
        assert_ne!(anonymous.id, authenticated.id);
    }

    #[tokio::test]
    async fn test_expired_session_is_returned_deactivated_and_not_replaced() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let manager = TeaserSessionManager::new(&db);
        let config = teaser_config(profile_id, true, 30);

        let session = manager
            .get_or_create(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap()
            .unwrap();
        force_expiry(&db, session.id).await;

        let lapsed = manager
            .get_or_create(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lapsed.id, session.id);
        assert!(!lapsed.active);
        assert!(lapsed.is_expired(Utc::now()));

        // Still no fresh window on the next request
        let again = manager
            .get_or_create(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.id, session.id);
    }

    #[tokio::test]
    async fn test_status_reports_active_window() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let manager = TeaserSessionManager::new(&db);
        let config = teaser_config(profile_id, true, 30);

        let session = manager
            .get_or_create(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap()
            .unwrap();

        let status = manager
            .status(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap();
        assert!(status.active);
        assert_eq!(status.expires_at, Some(session.expires));
        let remaining = status.remaining_seconds.unwrap();
        assert!(remaining <= 30 && remaining >= 28);
    }

    #[tokio::test]
    async fn test_status_lazily_deactivates_expired_session() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let manager = TeaserSessionManager::new(&db);
        let config = teaser_config(profile_id, true, 30);

        let session = manager
            .get_or_create(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap()
            .unwrap();
        force_expiry(&db, session.id).await;

        let status = manager
            .status(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap();
        assert!(!status.active);
        assert!(status.remaining_seconds.is_none());

        let db = db.lock().await;
        let stored = TeaserSession::Entity::find_by_id(session.id)
            .one(&*db)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.active);
    }

    #[tokio::test]
    async fn test_status_without_session() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let manager = TeaserSessionManager::new(&db);
        let config = teaser_config(profile_id, true, 30);

        let status = manager
            .status(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap();
        assert!(!status.active);
        assert_eq!(status.message, config.expired_message);
    }

    #[tokio::test]
    async fn test_deactivate_expired_sweep() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let manager = TeaserSessionManager::new(&db);
        let config = teaser_config(profile_id, true, 30);

        let expired = manager
            .get_or_create(profile_id, None, "192.0.2.1", &config)
            .await
            .unwrap()
            .unwrap();
        force_expiry(&db, expired.id).await;
        manager
            .get_or_create(profile_id, None, "192.0.2.2", &config)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(manager.deactivate_expired().await.unwrap(), 1);
        // Running it again finds nothing left to do
        assert_eq!(manager.deactivate_expired().await.unwrap(), 0);
    }

    #[test]
    fn test_duration_bounds() {
        assert!(validate_teaser_duration(4).is_err());
        assert!(validate_teaser_duration(5).is_ok());
        assert!(validate_teaser_duration(300).is_ok());
        assert!(validate_teaser_duration(301).is_err());
    }
}
