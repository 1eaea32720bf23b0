use std::sync::Arc;

use anyhow::Result;
use sea_orm::DatabaseConnection;
use stagedoor_common::StagedoorConfig;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::db::{connect_to_db, populate_db};
use crate::{
    AccessDecisionEngine, GeoResolverEnum, StaticGeoResolver, TeaserSessionManager,
};

#[derive(Clone)]
pub struct Services {
    pub db: Arc<Mutex<DatabaseConnection>>,
    pub config: Arc<Mutex<StagedoorConfig>>,
    pub geo_resolver: Arc<Mutex<GeoResolverEnum>>,
    pub teaser_sessions: Arc<TeaserSessionManager>,
    pub access_engine: Arc<AccessDecisionEngine>,
}

impl Services {
    pub async fn new(config: StagedoorConfig) -> Result<Self> {
        let mut db = connect_to_db(&config).await?;
        populate_db(&mut db).await?;
        let db = Arc::new(Mutex::new(db));

        let geo_resolver = Arc::new(Mutex::new(
            StaticGeoResolver::new(&config.store.geo).into(),
        ));

        let teaser_sessions = Arc::new(TeaserSessionManager::new(&db));
        let access_engine = Arc::new(AccessDecisionEngine::new(&db, teaser_sessions.clone()));

        let sweep_interval = config.store.teaser.sweep_interval;
        tokio::spawn({
            let teaser_sessions = teaser_sessions.clone();
            async move {
                loop {
                    tokio::time::sleep(sweep_interval).await;
                    match teaser_sessions.deactivate_expired().await {
                        Ok(0) => (),
                        Ok(count) => debug!(count, "Swept expired teaser sessions"),
                        Err(error) => warn!(?error, "Teaser session sweep failed"),
                    }
                }
            }
        });

        Ok(Self {
            db,
            config: Arc::new(Mutex::new(config)),
            geo_resolver,
            teaser_sessions,
            access_engine,
        })
    }
}
