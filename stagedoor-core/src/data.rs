use chrono::{DateTime, Utc};
use poem_openapi::{Enum, Object};
use serde::Serialize;
use stagedoor_db_entities::GeoRule::Tier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
#[oai(rename_all = "snake_case")]
pub enum AccessLevel {
    Full,
    Teaser,
    Blocked,
}

/// The outcome of a single access check. Derived per request, never stored.
#[derive(Debug, Clone, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename = "AccessDecision", rename_all = "camelCase")]
pub struct AccessDecision {
    pub access_level: AccessLevel,
    pub allowed: bool,
    pub reason: String,
    /// Only present while a teaser preview is running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teaser_remaining_seconds: Option<i64>,
    /// Only present when access was denied for subscription reasons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_required: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename = "TeaserStatus", rename_all = "camelCase")]
pub struct TeaserStatus {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub message: String,
}
