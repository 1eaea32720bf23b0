use std::sync::Arc;

use poem::web::Data;
use poem_openapi::param::{Path, Query};
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, OpenApi};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use stagedoor_common::StagedoorError;
use stagedoor_db_entities::{Profile, TeaserSession};
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct Api;

#[derive(ApiResponse)]
enum GetTeaserSessionsResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<TeaserSession::Model>>),
    #[oai(status = 404)]
    NotFound,
}

#[OpenApi]
impl Api {
    #[oai(
        path = "/profile/:id/teaser-sessions",
        method = "get",
        operation_id = "get_teaser_sessions"
    )]
    async fn api_get_teaser_sessions(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        active_only: Query<Option<bool>>,
    ) -> Result<GetTeaserSessionsResponse, StagedoorError> {
        let db = db.lock().await;

        if Profile::Entity::find_by_id(id.0).one(&*db).await?.is_none() {
            return Ok(GetTeaserSessionsResponse::NotFound);
        }

        let mut q = TeaserSession::Entity::find()
            .filter(TeaserSession::Column::ProfileId.eq(id.0))
            .order_by_desc(TeaserSession::Column::Started);

        if active_only.unwrap_or(false) {
            q = q.filter(TeaserSession::Column::Active.eq(true));
        }

        let sessions = q.all(&*db).await?;

        Ok(GetTeaserSessionsResponse::Ok(Json(sessions)))
    }
}
