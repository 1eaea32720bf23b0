use poem_openapi::Object;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};
use serde::Serialize;
use uuid::Uuid;

pub const DEFAULT_DURATION_SECONDS: i32 = 60;
pub const DEFAULT_EXPIRED_MESSAGE: &str =
    "Your preview has ended. Subscribe to keep watching this profile.";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Object)]
#[sea_orm(table_name = "teaser_configs")]
#[oai(rename = "TeaserConfig")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub profile_id: Uuid,
    pub enabled: bool,
    pub duration_seconds: i32,
    #[sea_orm(column_type = "Text")]
    pub expired_message: String,
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

impl Entity {
    /// Teaser configs are created lazily on first read, disabled by default.
    /// They are only ever updated afterwards, never deleted.
    pub async fn get_or_create<C: ConnectionTrait>(
        db: &C,
        profile_id: Uuid,
    ) -> Result<Model, DbErr> {
        match Self::find()
            .filter(Column::ProfileId.eq(profile_id))
            .one(db)
            .await?
        {
            Some(model) => Ok(model),
            None => {
                ActiveModel {
                    id: Set(Uuid::new_v4()),
                    profile_id: Set(profile_id),
                    enabled: Set(false),
                    duration_seconds: Set(DEFAULT_DURATION_SECONDS),
                    expired_message: Set(DEFAULT_EXPIRED_MESSAGE.to_owned()),
                }
                .insert(db)
                .await
            }
        }
    }
}
