use std::sync::Arc;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use stagedoor_common::{Location, ProfileId, StagedoorError};
use stagedoor_db_entities::GeoRule;
use stagedoor_db_entities::GeoRule::{RuleScope, Tier};
use tokio::sync::Mutex;

/// The result of matching a location against a profile's geo rules.
#[derive(Debug, Clone)]
pub struct GeoVerdict {
    pub allowed: bool,
    pub tier: Option<Tier>,
    pub reason: String,
}

pub struct GeoPolicyEvaluator {
    db: Arc<Mutex<DatabaseConnection>>,
}

impl GeoPolicyEvaluator {
    pub fn new(db: &Arc<Mutex<DatabaseConnection>>) -> Self {
        Self { db: db.clone() }
    }

    pub async fn evaluate(
        &self,
        profile_id: ProfileId,
        location: &Location,
    ) -> Result<GeoVerdict, StagedoorError> {
        let db = self.db.lock().await;
        let rules = GeoRule::Entity::find()
            .filter(GeoRule::Column::ProfileId.eq(profile_id))
            .order_by_asc(GeoRule::Column::Position)
            .all(&*db)
            .await?;

        Ok(match_rules(&rules, location))
    }
}

/// Scans the rules in their stored order; the first matching rule decides.
///
/// A profile with no rules at all is open to the world at the free tier,
/// while a profile with rules that match nothing is closed. Profile owners
/// rely on that switch to run allow-lists, so both defaults must stay as
/// they are.
pub fn match_rules(rules: &[GeoRule::Model], location: &Location) -> GeoVerdict {
    if rules.is_empty() {
        return GeoVerdict {
            allowed: true,
            tier: Some(Tier::Free),
            reason: "global access".into(),
        };
    }

    for rule in rules {
        if !rule_matches(rule, location) {
            continue;
        }
        return if rule.is_allowed {
            GeoVerdict {
                allowed: true,
                tier: Some(rule.tier.clone()),
                reason: "location allowed".into(),
            }
        } else {
            GeoVerdict {
                allowed: false,
                tier: None,
                reason: "location blocked by profile rules".into(),
            }
        };
    }

    GeoVerdict {
        allowed: false,
        tier: None,
        reason: "location not in allowed regions".into(),
    }
}

fn rule_matches(rule: &GeoRule::Model, location: &Location) -> bool {
    let field = match rule.scope {
        RuleScope::Country => location.country_code.as_deref(),
        RuleScope::State => location.state_code.as_deref(),
        RuleScope::City => location.city.as_deref(),
        RuleScope::Zip => location.zip_code.as_deref(),
    };
    let Some(field) = field else {
        return false;
    };
    match rule.scope {
        RuleScope::Zip => field == rule.value,
        _ => field.eq_ignore_ascii_case(&rule.value),
    }
}
