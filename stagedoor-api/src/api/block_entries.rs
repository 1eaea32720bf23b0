use std::sync::Arc;

use poem::web::Data;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object, OpenApi};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use stagedoor_common::StagedoorError;
use stagedoor_core::BlockListEvaluator;
use stagedoor_db_entities::BlockEntry::BlockReason;
use stagedoor_db_entities::{BlockEntry, Profile};
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct Api;

#[derive(Object)]
struct BlockEntryDataRequest {
    viewer_id: Option<Uuid>,
    viewer_ip: Option<String>,
    reason: BlockReason,
    notes: Option<String>,
}

#[derive(ApiResponse)]
enum GetBlockEntriesResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<BlockEntry::Model>>),
    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum CreateBlockEntryResponse {
    #[oai(status = 201)]
    Created(Json<BlockEntry::Model>),

    #[oai(status = 400)]
    BadRequest(Json<String>),

    /// The viewer is already blocked for this profile.
    #[oai(status = 409)]
    Conflict(Json<String>),

    #[oai(status = 404)]
    NotFound,
}

#[derive(ApiResponse)]
enum DeleteBlockEntryResponse {
    #[oai(status = 204)]
    Deleted,
    #[oai(status = 404)]
    NotFound,
}

#[OpenApi]
impl Api {
    #[oai(
        path = "/profile/:id/block-entries",
        method = "get",
        operation_id = "get_block_entries"
    )]
    async fn api_get_block_entries(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
    ) -> Result<GetBlockEntriesResponse, StagedoorError> {
        let db = db.lock().await;

        if Profile::Entity::find_by_id(id.0).one(&*db).await?.is_none() {
            return Ok(GetBlockEntriesResponse::NotFound);
        }

        let entries = BlockEntry::Entity::find()
            .filter(BlockEntry::Column::ProfileId.eq(id.0))
            .order_by_desc(BlockEntry::Column::Created)
            .all(&*db)
            .await?;

        Ok(GetBlockEntriesResponse::Ok(Json(entries)))
    }

    #[oai(
        path = "/profile/:id/block-entries",
        method = "post",
        operation_id = "create_block_entry"
    )]
    async fn api_create_block_entry(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        body: Json<BlockEntryDataRequest>,
    ) -> Result<CreateBlockEntryResponse, StagedoorError> {
        {
            let db = db.lock().await;
            if Profile::Entity::find_by_id(id.0).one(&*db).await?.is_none() {
                return Ok(CreateBlockEntryResponse::NotFound);
            }
        }

        let evaluator = BlockListEvaluator::new(db.0);
        let result = evaluator
            .add_entry(
                id.0,
                body.viewer_id,
                body.viewer_ip.clone(),
                body.reason.clone(),
                body.notes.clone().unwrap_or_default(),
            )
            .await;

        match result {
            Ok(entry) => Ok(CreateBlockEntryResponse::Created(Json(entry))),
            Err(error @ StagedoorError::MissingBlockSubject) => {
                Ok(CreateBlockEntryResponse::BadRequest(Json(error.to_string())))
            }
            Err(error @ StagedoorError::DuplicateBlockEntry) => {
                Ok(CreateBlockEntryResponse::Conflict(Json(error.to_string())))
            }
            Err(error) => Err(error),
        }
    }

    #[oai(
        path = "/profile/:id/block-entries/:entry_id",
        method = "delete",
        operation_id = "delete_block_entry"
    )]
    async fn api_delete_block_entry(
        &self,
        db: Data<&Arc<Mutex<DatabaseConnection>>>,
        id: Path<Uuid>,
        entry_id: Path<Uuid>,
    ) -> Result<DeleteBlockEntryResponse, StagedoorError> {
        let evaluator = BlockListEvaluator::new(db.0);

        if evaluator.remove_entry(id.0, entry_id.0).await? {
            Ok(DeleteBlockEntryResponse::Deleted)
        } else {
            Ok(DeleteBlockEntryResponse::NotFound)
        }
    }
}
