use chrono::{DateTime, Utc};
use poem_openapi::Object;
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Object)]
#[sea_orm(table_name = "teaser_sessions")]
#[oai(rename = "TeaserSession")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub profile_id: Uuid,
    pub viewer_id: Option<Uuid>,
    pub viewer_ip: String,
    /// Canonical lookup key: `user:<viewer_id>` when the viewer is
    /// authenticated, `ip:<viewer_ip>` otherwise.
    pub viewer_key: String,
    pub started: DateTime<Utc>,
    pub expires: DateTime<Utc>,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::Profile::Entity",
        from = "Column::ProfileId",
        to = "super::Profile::Column::Id"
    )]
    Profile,
}

impl Related<super::Profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}

/// Builds the canonical session lookup key for a viewer.
pub fn viewer_key(viewer_id: Option<Uuid>, viewer_ip: &str) -> String {
    match viewer_id {
        Some(id) => format!("user:{id}"),
        None => format!("ip:{viewer_ip}"),
    }
}
