use std::sync::Arc;

use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    TransactionTrait,
};
use stagedoor_common::{ProfileId, StagedoorError};
use stagedoor_db_entities::BlockEntry;
use stagedoor_db_entities::BlockEntry::BlockReason;
use tokio::sync::Mutex;
use tracing::*;
use uuid::Uuid;

/// Read-side of a profile's blocklist, plus the owner-facing mutations that
/// keep its invariants (a viewer is blocked at most once per profile).
pub struct BlockListEvaluator {
    db: Arc<Mutex<DatabaseConnection>>,
}

impl BlockListEvaluator {
    pub fn new(db: &Arc<Mutex<DatabaseConnection>>) -> Self {
        Self { db: db.clone() }
    }

    /// Returns the matching block entry, if any. The viewer-id entry is
    /// checked before the IP entry; the first hit wins and no reasons are
    /// aggregated.
    pub async fn find_block(
        &self,
        profile_id: ProfileId,
        viewer_id: Option<Uuid>,
        viewer_ip: &str,
    ) -> Result<Option<BlockEntry::Model>, StagedoorError> {
        let db = self.db.lock().await;

        if let Some(viewer_id) = viewer_id {
            let entry = BlockEntry::Entity::find()
                .filter(BlockEntry::Column::ProfileId.eq(profile_id))
                .filter(BlockEntry::Column::ViewerId.eq(viewer_id))
                .one(&*db)
                .await?;
            if entry.is_some() {
                return Ok(entry);
            }
        }

        Ok(BlockEntry::Entity::find()
            .filter(BlockEntry::Column::ProfileId.eq(profile_id))
            .filter(BlockEntry::Column::ViewerIp.eq(viewer_ip))
            .one(&*db)
            .await?)
    }

    /// Creates a block entry for a viewer id and/or an IP address.
    /// A duplicate block of the same viewer (or the same IP, for anonymous
    /// entries) is rejected rather than merged.
    pub async fn add_entry(
        &self,
        profile_id: ProfileId,
        viewer_id: Option<Uuid>,
        viewer_ip: Option<String>,
        reason: BlockReason,
        notes: String,
    ) -> Result<BlockEntry::Model, StagedoorError> {
        if viewer_id.is_none() && viewer_ip.is_none() {
            return Err(StagedoorError::MissingBlockSubject);
        }

        let db = self.db.lock().await;
        let txn = db.begin().await?;

        let existing = match viewer_id {
            Some(viewer_id) => {
                BlockEntry::Entity::find()
                    .filter(BlockEntry::Column::ProfileId.eq(profile_id))
                    .filter(BlockEntry::Column::ViewerId.eq(viewer_id))
                    .one(&txn)
                    .await?
            }
            None => {
                BlockEntry::Entity::find()
                    .filter(BlockEntry::Column::ProfileId.eq(profile_id))
                    .filter(BlockEntry::Column::ViewerId.is_null())
                    .filter(BlockEntry::Column::ViewerIp.eq(viewer_ip.clone()))
                    .one(&txn)
                    .await?
            }
        };
        if existing.is_some() {
            return Err(StagedoorError::DuplicateBlockEntry);
        }

        let entry = BlockEntry::ActiveModel {
            id: Set(Uuid::new_v4()),
            profile_id: Set(profile_id),
            viewer_id: Set(viewer_id),
            viewer_ip: Set(viewer_ip),
            reason: Set(reason),
            notes: Set(notes),
            created: Set(chrono::Utc::now()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(%profile_id, entry_id = %entry.id, "Viewer blocked");
        Ok(entry)
    }

    pub async fn remove_entry(
        &self,
        profile_id: ProfileId,
        entry_id: Uuid,
    ) -> Result<bool, StagedoorError> {
        let db = self.db.lock().await;

        let Some(entry) = BlockEntry::Entity::find_by_id(entry_id)
            .filter(BlockEntry::Column::ProfileId.eq(profile_id))
            .one(&*db)
            .await?
        else {
            return Ok(false);
        };

        entry.delete(&*db).await?;
        info!(%profile_id, %entry_id, "Viewer unblocked");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Mutex;

    use super::*;
    use crate::test_support::{connect_test_db, create_profile};

    #[tokio::test]
    async fn test_viewer_id_block_checked_before_ip() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let evaluator = BlockListEvaluator::new(&db);

        let viewer_id = Uuid::new_v4();
        evaluator
            .add_entry(
                profile_id,
                Some(viewer_id),
                None,
                BlockReason::Harassment,
                "".into(),
            )
            .await
            .unwrap();
        evaluator
            .add_entry(
                profile_id,
                None,
                Some("192.0.2.1".into()),
                BlockReason::Spam,
                "".into(),
            )
            .await
            .unwrap();

        // Both the viewer id and the IP have entries; the viewer-id one wins
        let entry = evaluator
            .find_block(profile_id, Some(viewer_id), "192.0.2.1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.reason, BlockReason::Harassment);

        // Anonymous viewer from the same IP falls through to the IP entry
        let entry = evaluator
            .find_block(profile_id, None, "192.0.2.1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.reason, BlockReason::Spam);
    }

    #[tokio::test]
    async fn test_unblocked_viewer_is_not_matched() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let evaluator = BlockListEvaluator::new(&db);

        assert!(evaluator
            .find_block(profile_id, Some(Uuid::new_v4()), "198.51.100.7")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_block_is_rejected() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let evaluator = BlockListEvaluator::new(&db);

        let viewer_id = Uuid::new_v4();
        evaluator
            .add_entry(
                profile_id,
                Some(viewer_id),
                None,
                BlockReason::BadLanguage,
                "".into(),
            )
            .await
            .unwrap();

        let result = evaluator
            .add_entry(
                profile_id,
                Some(viewer_id),
                None,
                BlockReason::Other,
                "second attempt".into(),
            )
            .await;
        assert!(matches!(result, Err(StagedoorError::DuplicateBlockEntry)));

        let db = db.lock().await;
        let count = BlockEntry::Entity::find()
            .filter(BlockEntry::Column::ProfileId.eq(profile_id))
            .all(&*db)
            .await
            .unwrap()
            .len();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_block_entry_needs_a_subject() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let evaluator = BlockListEvaluator::new(&db);

        let result = evaluator
            .add_entry(profile_id, None, None, BlockReason::Other, "".into())
            .await;
        assert!(matches!(result, Err(StagedoorError::MissingBlockSubject)));
    }

    #[tokio::test]
    async fn test_remove_entry() {
        let db = Arc::new(Mutex::new(connect_test_db().await));
        let profile_id = create_profile(&db).await;
        let evaluator = BlockListEvaluator::new(&db);

        let entry = evaluator
            .add_entry(
                profile_id,
                None,
                Some("203.0.113.9".into()),
                BlockReason::Spam,
                "".into(),
            )
            .await
            .unwrap();

        assert!(evaluator.remove_entry(profile_id, entry.id).await.unwrap());
        assert!(!evaluator.remove_entry(profile_id, entry.id).await.unwrap());
        assert!(evaluator
            .find_block(profile_id, None, "203.0.113.9")
            .await
            .unwrap()
            .is_none());
    }
}
