use std::sync::Arc;

use poem::web::Data;
use poem_openapi::param::{Path, Query};
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object, OpenApi};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use stagedoor_common::StagedoorError;
use stagedoor_db_entities::{BlockEntry, GeoRule, Profile, TeaserConfig, TeaserSession};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Object)]
struct ProfileDataRequest {
    name: String,
    description: Option<String>,
}

#[derive(ApiResponse)]
enum GetProfilesResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<Profile::Model>>),
}

#[derive(ApiResponse)]
enum CreateProfileResponse {
    #[oai(status = 201)]
    Created(Json<Profile::Model>),

    #[oai(status = 400)]
    BadRequest(Json<String>),
}

pub struct ListApi;

#[OpenApi]
impl ListApi {
    #[oai(path = "/profiles", method = "get", operation_id = "get_profiles")]
    async fn api_get_all_profiles(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        search: Query<Option<String>>,
    ) -> Result<GetProfilesResponse, StagedoorError> {
        let db = db.lock().await;

        let mut profiles = Profile::Entity::find().order_by_asc(Profile::Column::Name);

        if let Some(ref search) = *search {
            let search = format!("%{search}%");
            profiles = profiles.filter(Profile::Column::Name.like(search));
        }

        let profiles = profiles.all(&*db).await?;

        Ok(GetProfilesResponse::Ok(Json(profiles)))
    }

    #[oai(path = "/profiles", method = "post", operation_id = "create_profile")]
    async fn api_create_profile(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        body: Json<ProfileDataRequest>,
    ) -> Result<CreateProfileResponse, StagedoorError> {
        if body.name.is_empty() {
            return Ok(CreateProfileResponse::BadRequest(Json("name".into())));
        }

        let db = db.lock().await;

        let values = Profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(body.name.clone()),
            description: Set(body.description.clone().unwrap_or_default()),
            created: Set(chrono::Utc::now()),
        };

        let profile = values.insert(&*db).await?;

        Ok(CreateProfileResponse::Created(Json(profile)))
    }
}

#[derive(ApiResponse)]
enum GetProfileResponse {
    #[oai(status = 200)]
    Ok(Json<Profile::Model>),
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum DeleteProfileResponse {
    #[oai(status = 204)]
    Deleted,
    #[oai(status = 404)]
    NotFound,
}

pub struct DetailApi;

#[OpenApi]
impl DetailApi {
    #[oai(path = "/profile/:id", method = "get", operation_id = "get_profile")]
    async fn api_get_profile(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
    ) -> Result<GetProfileResponse, StagedoorError> {
        let db = db.lock().await;

        let profile = Profile::Entity::find_by_id(id.0).one(&*db).await?;

        Ok(match profile {
            Some(profile) => GetProfileResponse::Ok(Json(profile)),
            None => GetProfileResponse::NotFound,
        })
    }

    #[oai(
        path = "/profile/:id",
        method = "delete",
        operation_id = "delete_profile"
    )]
    async fn api_delete_profile(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
    ) -> Result<DeleteProfileResponse, StagedoorError> {
        let db = db.lock().await;

        let Some(profile) = Profile::Entity::find_by_id(id.0).one(&*db).await? else {
            return Ok(DeleteProfileResponse::NotFound);
        };

        let txn = db.begin().await?;

        GeoRule::Entity::delete_many()
            .filter(GeoRule::Column::ProfileId.eq(profile.id))
            .exec(&txn)
            .await?;
        TeaserConfig::Entity::delete_many()
            .filter(TeaserConfig::Column::ProfileId.eq(profile.id))
            .exec(&txn)
            .await?;
        TeaserSession::Entity::delete_many()
            .filter(TeaserSession::Column::ProfileId.eq(profile.id))
            .exec(&txn)
            .await?;
        BlockEntry::Entity::delete_many()
            .filter(BlockEntry::Column::ProfileId.eq(profile.id))
            .exec(&txn)
            .await?;
        profile.delete(&txn).await?;

        txn.commit().await?;

        Ok(DeleteProfileResponse::Deleted)
    }
}
