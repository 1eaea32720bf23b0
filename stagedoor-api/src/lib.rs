mod api;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use poem::listener::TcpListener;
use poem::{EndpointExt, Route, Server};
use poem_openapi::OpenApiService;
use stagedoor_core::Services;
use tracing::*;

#[derive(Clone)]
pub struct ApiServer {
    services: Services,
}

impl ApiServer {
    pub fn new(services: &Services) -> Self {
        ApiServer {
            services: services.clone(),
        }
    }

    pub async fn run(self, address: SocketAddr) -> Result<()> {
        let api_service =
            OpenApiService::new(api::get(), "Stagedoor API", env!("CARGO_PKG_VERSION"))
                .server("/api");

        let app = Route::new()
            .nest("/api", api_service)
            .data(self.services.db.clone())
            .data(self.services.clone());

        info!(?address, "Listening");
        Server::new(TcpListener::bind(address))
            .run(app)
            .await
            .context("Failed to start the API server")
    }
}
