use std::net::IpAddr;

use poem::web::Data;
use poem_openapi::param::{Path, Query};
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object, OpenApi};
use stagedoor_common::{Location, StagedoorError};
use stagedoor_core::{AccessDecision, GeoResolver, Services, TeaserStatus};
use stagedoor_db_entities::TeaserConfig;
use uuid::Uuid;

pub struct Api;

#[derive(Object)]
#[oai(rename_all = "camelCase")]
struct AccessCheckRequest {
    viewer_id: Option<Uuid>,
    ip: String,
    /// Pre-resolved location, for callers that sit behind their own
    /// geo-IP integration. When absent, the configured resolver is used.
    location: Option<Location>,
}

#[derive(ApiResponse)]
enum AccessCheckResponse {
    #[oai(status = 200)]
    Ok(Json<AccessDecision>),

    #[oai(status = 400)]
    BadRequest(Json<String>),
}

#[derive(ApiResponse)]
enum TeaserStatusResponse {
    #[oai(status = 200)]
    Ok(Json<TeaserStatus>),

    #[oai(status = 400)]
    BadRequest(Json<String>),
}

#[OpenApi]
impl Api {
    #[oai(
        path = "/profile/:id/access-check",
        method = "post",
        operation_id = "check_access"
    )]
    async fn api_check_access(
        &self,
        services: Data<&Services>,
        id: Path<Uuid>,
        body: Json<AccessCheckRequest>,
    ) -> Result<AccessCheckResponse, StagedoorError> {
        let Ok(ip) = body.ip.parse::<IpAddr>() else {
            return Ok(AccessCheckResponse::BadRequest(Json("ip".into())));
        };

        let location = match &body.location {
            Some(location) => location.clone(),
            None => services
                .geo_resolver
                .lock()
                .await
                .resolve(ip)
                .await?
                .unwrap_or_default(),
        };

        let decision = services
            .access_engine
            .decide(id.0, body.viewer_id, &ip.to_string(), &location)
            .await?;

        Ok(AccessCheckResponse::Ok(Json(decision)))
    }

    #[oai(
        path = "/profile/:id/teaser-status",
        method = "get",
        operation_id = "get_teaser_status"
    )]
    async fn api_get_teaser_status(
        &self,
        services: Data<&Services>,
        id: Path<Uuid>,
        ip: Query<String>,
        viewer_id: Query<Option<Uuid>>,
    ) -> Result<TeaserStatusResponse, StagedoorError> {
        let Ok(ip) = ip.0.parse::<IpAddr>() else {
            return Ok(TeaserStatusResponse::BadRequest(Json("ip".into())));
        };

        let config = {
            let db = services.db.lock().await;
            TeaserConfig::Entity::get_or_create(&*db, id.0).await?
        };

        let status = services
            .teaser_sessions
            .status(id.0, viewer_id.0, &ip.to_string(), &config)
            .await?;

        Ok(TeaserStatusResponse::Ok(Json(status)))
    }
}
