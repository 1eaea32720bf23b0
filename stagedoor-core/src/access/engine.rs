use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use stagedoor_common::{Location, ProfileId, StagedoorError};
use stagedoor_db_entities::GeoRule::Tier;
use stagedoor_db_entities::TeaserConfig;
use tokio::sync::Mutex;
use tracing::*;
use uuid::Uuid;

use super::{BlockListEvaluator, GeoPolicyEvaluator, TeaserSessionManager};
use crate::{AccessDecision, AccessLevel};

/// Decides what a viewer gets to see of a profile. Checks run strictly in
/// order - blocklist, geo policy, tier - and each failed check is terminal.
/// Infrastructure failures surface as `Err`, never as a blocked decision.
pub struct AccessDecisionEngine {
    db: Arc<Mutex<DatabaseConnection>>,
    block_list: BlockListEvaluator,
    geo_policy: GeoPolicyEvaluator,
    teaser_sessions: Arc<TeaserSessionManager>,
}

impl AccessDecisionEngine {
    pub fn new(
        db: &Arc<Mutex<DatabaseConnection>>,
        teaser_sessions: Arc<TeaserSessionManager>,
    ) -> Self {
        Self {
            db: db.clone(),
            block_list: BlockListEvaluator::new(db),
            geo_policy: GeoPolicyEvaluator::new(db),
            teaser_sessions,
        }
    }

    pub async fn decide(
        &self,
        profile_id: ProfileId,
        viewer_id: Option<Uuid>,
        viewer_ip: &str,
        location: &Location,
    ) -> Result<AccessDecision, StagedoorError> {
        if let Some(entry) = self
            .block_list
            .find_block(profile_id, viewer_id, viewer_ip)
            .await?
        {
            debug!(%profile_id, entry_id = %entry.id, "Access denied by blocklist");
            return Ok(AccessDecision {
                access_level: AccessLevel::Blocked,
                allowed: false,
                reason: format!("blocked by profile owner: {}", entry.reason),
                teaser_remaining_seconds: None,
                subscription_required: None,
                message: None,
            });
        }

        let verdict = self.geo_policy.evaluate(profile_id, location).await?;
        if !verdict.allowed {
            debug!(%profile_id, reason = %verdict.reason, "Access denied by geo policy");
            return Ok(AccessDecision {
                access_level: AccessLevel::Blocked,
                allowed: false,
                reason: verdict.reason,
                teaser_remaining_seconds: None,
                subscription_required: None,
                message: None,
            });
        }
        let tier = verdict.tier.ok_or(StagedoorError::InconsistentState)?;

        match tier {
            Tier::Free => Ok(AccessDecision {
                access_level: AccessLevel::Full,
                allowed: true,
                reason: verdict.reason,
                teaser_remaining_seconds: None,
                subscription_required: None,
                message: None,
            }),
            Tier::Teaser => {
                let config = {
                    let db = self.db.lock().await;
                    TeaserConfig::Entity::get_or_create(&*db, profile_id).await?
                };

                let session = self
                    .teaser_sessions
                    .get_or_create(profile_id, viewer_id, viewer_ip, &config)
                    .await?;

                let now = Utc::now();
                match session {
                    Some(session) if !session.is_expired(now) => Ok(AccessDecision {
                        access_level: AccessLevel::Teaser,
                        allowed: true,
                        reason: "teaser preview active".into(),
                        teaser_remaining_seconds: Some((session.expires - now).num_seconds()),
                        subscription_required: None,
                        message: None,
                    }),
                    // Teaser disabled, or this viewer's window has lapsed:
                    // either way the upsell target is a subscription.
                    _ => Ok(AccessDecision {
                        access_level: AccessLevel::Blocked,
                        allowed: false,
                        reason: "teaser expired".into(),
                        teaser_remaining_seconds: None,
                        subscription_required: Some(Tier::Monthly),
                        message: Some(config.expired_message),
                    }),
                }
            }
            tier @ (Tier::Monthly | Tier::PerVisit) => Ok(AccessDecision {
                access_level: AccessLevel::Blocked,
                allowed: false,
                reason: "subscription required".into(),
                teaser_remaining_seconds: None,
                subscription_required: Some(tier),
                message: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sea_orm::ActiveValue::Set;
    use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel};
    use stagedoor_db_entities::GeoRule::RuleScope;
    use stagedoor_db_entities::{BlockEntry, GeoRule, TeaserSession};
    use tokio::sync::Mutex;

    use super::*;
    use crate::test_support::{connect_test_db, create_profile};

    async fn add_rule(
        db: &Arc<Mutex<DatabaseConnection>>,
        profile_id: ProfileId,
        position: i32,
        scope: RuleScope,
        value: &str,
        is_allowed: bool,
        tier: Tier,
    ) {
        let db = db.lock().await;
        GeoRule::ActiveModel {
            id: Set(Uuid::new_v4()),
            profile_id: Set(profile_id),
            scope: Set(scope),
            value: Set(value.to_owned()),
            is_allowed: Set(is_allowed),
            tier: Set(tier),
            position: Set(position),
            created: Set(Utc::now()),
        }
        .insert(&*db)
        .await
        .unwrap();
    }

    async fn enable_teaser(
        db: &Arc<Mutex<DatabaseConnection>>,
        profile_id: ProfileId,
        duration_seconds: i32,
    ) {
        let db = db.lock().await;
        let config = TeaserConfig::Entity::get_or_create(&*db, profile_id)
            .await
            .unwrap();
        let mut model = config.into_active_model();
        model.enabled = Set(true);
        model.duration_seconds = Set(duration_seconds);
        model.update(&*db).await.unwrap();
    }

    /// Rule order pinned by the scenario: state=NY (teaser) first, then
    /// country=US (free), then country=CA (monthly).
    async fn scenario_profile(db: &Arc<Mutex<DatabaseConnection>>) -> Uuid {
        let profile_id = create_profile(db).await;
        add_rule(db, profile_id, 0, RuleScope::State, "NY", true, Tier::Teaser).await;
        add_rule(db, profile_id, 1, RuleScope::Country, "US", true, Tier::Free).await;
        add_rule(db, profile_id, 2, RuleScope::Country, "CA", true, Tier::Monthly).await;
        enable_teaser(db, profile_id, 30).await;
        profile_id
    }

    fn us(state_code: &str) -> Location {
        Location {
            country_code: Some("US".into()),
            state_code: Some(state_code.to_owned()),
            ..Default::default()
        }
    }

    fn ca() -> Location {
        Location {
            country_code: Some("CA".into()),
            state_code: Some("ON".into()),
            ..Default::default()
        }
    }

    fn engine(db: &Arc<Mutex<DatabaseConnection>>) -> AccessDecisionEngine {
        AccessDecisionEngine::new(db, Arc::new(TeaserSessionManager::new(db)))
    }

    #[tokio::test]
    async fn test_no_rules_means_free_full_access() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let engine = engine(&db);

        let decision = engine
            .decide(profile_id, None, "192.0.2.1", &Location::default())
            .await
            .unwrap();
        assert_eq!(decision.access_level, AccessLevel::Full);
        assert!(decision.allowed);
    }

    #[tokio::test]
    async fn test_us_viewer_gets_full_access() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = scenario_profile(&db).await;
        let engine = engine(&db);

        let decision = engine
            .decide(profile_id, None, "192.0.2.1", &us("CA"))
            .await
            .unwrap();
        assert_eq!(decision.access_level, AccessLevel::Full);
        assert!(decision.allowed);
        assert!(decision.subscription_required.is_none());
    }

    #[tokio::test]
    async fn test_ca_viewer_needs_monthly_subscription() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = scenario_profile(&db).await;
        let engine = engine(&db);

        let decision = engine
            .decide(profile_id, None, "192.0.2.1", &ca())
            .await
            .unwrap();
        assert_eq!(decision.access_level, AccessLevel::Blocked);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, "subscription required");
        assert_eq!(decision.subscription_required, Some(Tier::Monthly));
    }

    #[tokio::test]
    async fn test_ny_viewer_gets_teaser_then_blocked_after_expiry() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = scenario_profile(&db).await;
        let engine = engine(&db);

        let decision = engine
            .decide(profile_id, None, "192.0.2.1", &us("NY"))
            .await
            .unwrap();
        assert_eq!(decision.access_level, AccessLevel::Teaser);
        assert!(decision.allowed);
        let remaining = decision.teaser_remaining_seconds.unwrap();
        assert!(remaining <= 30 && remaining >= 28);

        // A second request does not reset the clock
        let decision = engine
            .decide(profile_id, None, "192.0.2.1", &us("NY"))
            .await
            .unwrap();
        assert_eq!(decision.access_level, AccessLevel::Teaser);
        assert!(decision.teaser_remaining_seconds.unwrap() <= remaining);

        // Push the window into the past instead of sleeping through it
        {
            let db = db.lock().await;
            let session = TeaserSession::Entity::find()
                .one(&*db)
                .await
                .unwrap()
                .unwrap();
            let mut model = session.into_active_model();
            model.expires = Set(Utc::now() - chrono::Duration::seconds(1));
            model.update(&*db).await.unwrap();
        }

        let decision = engine
            .decide(profile_id, None, "192.0.2.1", &us("NY"))
            .await
            .unwrap();
        assert_eq!(decision.access_level, AccessLevel::Blocked);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, "teaser expired");
        assert_eq!(decision.subscription_required, Some(Tier::Monthly));
        assert!(decision.message.is_some());
    }

    #[tokio::test]
    async fn test_teaser_tier_with_teasers_disabled_blocks() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        add_rule(&db, profile_id, 0, RuleScope::State, "NY", true, Tier::Teaser).await;
        // Teaser config is created lazily with enabled=false
        let engine = engine(&db);

        let decision = engine
            .decide(profile_id, None, "192.0.2.1", &us("NY"))
            .await
            .unwrap();
        assert_eq!(decision.access_level, AccessLevel::Blocked);
        assert_eq!(decision.reason, "teaser expired");
        assert_eq!(decision.subscription_required, Some(Tier::Monthly));
    }

    #[tokio::test]
    async fn test_blocked_viewer_is_denied_despite_geo_allow() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = scenario_profile(&db).await;
        let engine = engine(&db);

        let viewer_id = Uuid::new_v4();
        {
            let db = db.lock().await;
            BlockEntry::ActiveModel {
                id: Set(Uuid::new_v4()),
                profile_id: Set(profile_id),
                viewer_id: Set(Some(viewer_id)),
                viewer_ip: Set(None),
                reason: Set(BlockEntry::BlockReason::Harassment),
                notes: Set("".into()),
                created: Set(Utc::now()),
            }
            .insert(&*db)
            .await
            .unwrap();
        }

        // Geo policy alone would grant full access from the US
        let decision = engine
            .decide(profile_id, Some(viewer_id), "192.0.2.1", &us("CA"))
            .await
            .unwrap();
        assert_eq!(decision.access_level, AccessLevel::Blocked);
        assert!(!decision.allowed);
        assert!(decision.reason.contains("harassment"));
    }

    #[tokio::test]
    async fn test_unknown_location_denied_when_rules_exist() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = scenario_profile(&db).await;
        let engine = engine(&db);

        let decision = engine
            .decide(profile_id, None, "192.0.2.1", &Location::default())
            .await
            .unwrap();
        assert_eq!(decision.access_level, AccessLevel::Blocked);
        assert_eq!(decision.reason, "location not in allowed regions");
    }
}
