use anyhow::Result;
use futures::StreamExt;
use stagedoor_api::ApiServer;
use stagedoor_core::db::cleanup_db;
use stagedoor_core::Services;
use tracing::*;

use crate::config::{load_config, watch_config};

pub(crate) async fn command(cli: &crate::Cli) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    info!(%version, "Stagedoor");

    let config = load_config(&cli.config, true)?;
    let services = Services::new(config.clone()).await?;

    let mut server_futures = futures::stream::FuturesUnordered::new();

    if config.store.http.enable {
        server_futures.push(ApiServer::new(&services).run(*config.store.http.listen));
    }

    tokio::spawn({
        let services = services.clone();
        async move {
            loop {
                let retention = { services.config.lock().await.store.log.retention };
                let interval = retention / 10;
                match cleanup_db(&mut *services.db.lock().await, &retention).await {
                    Err(error) => error!(?error, "Failed to clean up the database"),
                    Ok(_) => debug!("Database cleaned up, next in {:?}", interval),
                }
                tokio::time::sleep(interval).await;
            }
        }
    });

    if console::user_attended() {
        info!("--------------------------------------------");
        info!("Stagedoor is now running.");
        if config.store.http.enable {
            info!("Serving the API on {}", *config.store.http.listen);
        }
        info!("--------------------------------------------");
    }

    drop(config);

    tokio::spawn(watch_config(cli.config.clone(), services.config.clone()));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                std::process::exit(1);
            }
            result = server_futures.next(), if !server_futures.is_empty() => {
                match result {
                    Some(Err(error)) => {
                        error!(?error, "API server error");
                        std::process::exit(1);
                    },
                    None => break,
                    _ => (),
                }
            }
        }
    }

    info!("Exiting");
    Ok(())
}
