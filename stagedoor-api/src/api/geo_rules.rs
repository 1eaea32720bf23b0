use std::sync::Arc;

use poem::web::Data;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object, OpenApi};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use stagedoor_common::StagedoorError;
use stagedoor_db_entities::GeoRule::{RuleScope, Tier};
use stagedoor_db_entities::{GeoRule, Profile};
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct Api;

#[derive(Object)]
struct GeoRuleDataRequest {
    scope: RuleScope,
    value: String,
    is_allowed: bool,
    tier: Tier,
}

#[derive(ApiResponse)]
enum GetGeoRulesResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<GeoRule::Model>>),
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum CreateGeoRuleResponse {
    #[oai(status = 201)]
    Created(Json<GeoRule::Model>),

    #[oai(status = 400)]
    BadRequest(Json<String>),

    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum DeleteGeoRuleResponse {
    #[oai(status = 204)]
    Deleted,
    #[oai(status = 404)]
    NotFound,
}

#[OpenApi]
impl Api {
    #[oai(
        path = "/profile/:id/geo-rules",
        method = "get",
        operation_id = "get_geo_rules"
    )]
    async fn api_get_geo_rules(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
    ) -> Result<GetGeoRulesResponse, StagedoorError> {
        let db = db.lock().await;

        if Profile::Entity::find_by_id(id.0).one(&*db).await?.is_none() {
            return Ok(GetGeoRulesResponse::NotFound);
        }

        let rules = GeoRule::Entity::find()
            .filter(GeoRule::Column::ProfileId.eq(id.0))
            .order_by_asc(GeoRule::Column::Position)
            .all(&*db)
            .await?;

        Ok(GetGeoRulesResponse::Ok(Json(rules)))
    }

    #[oai(
        path = "/profile/:id/geo-rules",
        method = "post",
        operation_id = "create_geo_rule"
    )]
    async fn api_create_geo_rule(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        body: Json<GeoRuleDataRequest>,
    ) -> Result<CreateGeoRuleResponse, StagedoorError> {
        if body.value.is_empty() {
            return Ok(CreateGeoRuleResponse::BadRequest(Json("value".into())));
        }

        let db = db.lock().await;

        if Profile::Entity::find_by_id(id.0).one(&*db).await?.is_none() {
            return Ok(CreateGeoRuleResponse::NotFound);
        }

        // Rules are evaluated in creation order; the position counter is
        // assigned inside the transaction so it stays gapless-monotonic
        // under concurrent creates.
        let txn = db.begin().await?;

        let last = GeoRule::Entity::find()
            .filter(GeoRule::Column::ProfileId.eq(id.0))
            .order_by_desc(GeoRule::Column::Position)
            .one(&txn)
            .await?;
        let position = last.map(|rule| rule.position + 1).unwrap_or(0);

        let rule = GeoRule::ActiveModel {
            id: Set(Uuid::new_v4()),
            profile_id: Set(id.0),
            scope: Set(body.scope.clone()),
            value: Set(body.value.clone()),
            is_allowed: Set(body.is_allowed),
            tier: Set(body.tier.clone()),
            position: Set(position),
            created: Set(chrono::Utc::now()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(CreateGeoRuleResponse::Created(Json(rule)))
    }

    #[oai(
        path = "/profile/:id/geo-rules/:rule_id",
        method = "delete",
        operation_id = "delete_geo_rule"
    )]
    async fn api_delete_geo_rule(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        rule_id: Path<Uuid>,
    ) -> Result<DeleteGeoRuleResponse, StagedoorError> {
        let db = db.lock().await;

        let rule = GeoRule::Entity::find_by_id(rule_id.0)
            .filter(GeoRule::Column::ProfileId.eq(id.0))
            .one(&*db)
            .await?;

        match rule {
            Some(rule) => {
                rule.delete(&*db).await?;
                Ok(DeleteGeoRuleResponse::Deleted)
            }
            None => Ok(DeleteGeoRuleResponse::NotFound),
        }
    }
}
