use std::sync::Arc;

use poem::web::Data;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object, OpenApi};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel};
use stagedoor_common::StagedoorError;
use stagedoor_core::validate_teaser_duration;
use stagedoor_db_entities::{Profile, TeaserConfig};
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct Api;

#[derive(Object)]
struct TeaserConfigDataRequest {
    enabled: bool,
    duration_seconds: i32,
    expired_message: Option<String>,
}

#[derive(ApiResponse)]
enum GetTeaserConfigResponse {
    #[oai(status = 200)]
    Ok(Json<TeaserConfig::Model>),
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum UpdateTeaserConfigResponse {
    #[oai(status = 200)]
    Ok(Json<TeaserConfig::Model>),

    #[oai(status = 400)]
    BadRequest(Json<String>),

    #[oai(status = 404)]
    NotFound,
}

#[OpenApi]
impl Api {
    #[oai(
        path = "/profile/:id/teaser-config",
        method = "get",
        operation_id = "get_teaser_config"
    )]
    async fn api_get_teaser_config(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
    ) -> Result<GetTeaserConfigResponse, StagedoorError> {
        let db = db.lock().await;

        if Profile::Entity::find_by_id(id.0).one(&*db).await?.is_none() {
            return Ok(GetTeaserConfigResponse::NotFound);
        }

        let config = TeaserConfig::Entity::get_or_create(&*db, id.0).await?;

        Ok(GetTeaserConfigResponse::Ok(Json(config)))
    }

    #[oai(
        path = "/profile/:id/teaser-config",
        method = "put",
        operation_id = "update_teaser_config"
    )]
    async fn api_update_teaser_config(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        body: Json<TeaserConfigDataRequest>,
    ) -> Result<UpdateTeaserConfigResponse, StagedoorError> {
        if let Err(error) = validate_teaser_duration(body.duration_seconds) {
            return Ok(UpdateTeaserConfigResponse::BadRequest(Json(
                error.to_string(),
            )));
        }

        let db = db.lock().await;

        if Profile::Entity::find_by_id(id.0).one(&*db).await?.is_none() {
            return Ok(UpdateTeaserConfigResponse::NotFound);
        }

        let config = TeaserConfig::Entity::get_or_create(&*db, id.0).await?;

        let mut model = config.into_active_model();
        model.enabled = Set(body.enabled);
        model.duration_seconds = Set(body.duration_seconds);
        if let Some(ref message) = body.expired_message {
            model.expired_message = Set(message.clone());
        }
        let config = model.update(&*db).await?;

        Ok(UpdateTeaserConfigResponse::Ok(Json(config)))
    }
}
