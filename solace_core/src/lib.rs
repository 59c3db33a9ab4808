pub mod booking;
pub mod config;
pub mod crypto;
pub mod entity;
pub mod error;
pub mod forum;
pub mod ids;
pub mod models;
pub mod service;
pub mod session;
pub mod telemetry;
pub mod thread;
pub mod timestamps;

#[cfg(test)]
pub(crate) mod test_utils;

use tokio::sync::OnceCell;

use std::{sync::Arc, time::Duration};

use iroh::Endpoint;
use zel_core::{prelude::RpcServerBuilder, protocol::RpcClient, IrohBundle};

use crate::service::{
    counseling::{CounselingClient, CounselingServer, CounselingService},
    forum::{ForumClient, ForumServer, ForumService},
    profiles::{ProfilesClient, ProfilesServer, ProfilesService},
};

static SOLACE_CORE: OnceCell<Arc<SolaceCore>> = OnceCell::const_new();
static ALPN: &[u8] = b"solace::0.1.0";

/// The process-wide runtime, started on first use.
pub async fn core() -> Result<Arc<SolaceCore>, Box<dyn std::error::Error>> {
    let core = SOLACE_CORE
        .get_or_try_init(|| async move { SolaceCore::start().await.map(Arc::new) })
        .await?;
    Ok(core.clone())
}

/// Main runtime handle for Solace.
pub struct SolaceCore {
    pub config: config::SolaceConfig,

    /// Server bundle that accepts inbound RPC traffic.
    pub server: IrohBundle,

    /// Client-side endpoint used by the UI to connect to the local server.
    pub client_endpoint: Endpoint,

    /// Typed clients for the local server.
    pub profiles: ProfilesClient,
    pub forum: ForumClient,
    pub counseling: CounselingClient,
}

impl SolaceCore {
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        telemetry::init();

        let config = config::get_or_init().await?;
        tracing::info!(database = %config.database_path.display(), "starting solace core");

        // ----------------
        // Server endpoint
        // ----------------
        let mut server_builder = IrohBundle::builder(Some(config.secret_key.clone())).await?;
        let server_endpoint = server_builder.endpoint().clone();

        // DB + migrations
        let db = models::open_or_create_db(&config).await?;
        models::migrate_up(&db).await?;

        let profiles_service = ProfilesService::new(db.clone(), config.pii_cipher()?);
        let forum_service = ForumService::new(db.clone(), profiles_service.clone());
        let counseling_service = CounselingService::new(db.clone());

        // Register RPC servers
        let rpc_server_builder = RpcServerBuilder::new(ALPN, server_endpoint.clone());

        let rpc_server_builder = profiles_service.register_service(rpc_server_builder);
        let rpc_server_builder = forum_service.register_service(rpc_server_builder);
        let rpc_server_builder = counseling_service.register_service(rpc_server_builder);

        let rpc_server = rpc_server_builder.build();

        let server = server_builder.accept(ALPN, rpc_server).finish().await;

        server.wait_online().await;

        // ----------------
        // Client endpoint (for UI)
        // ----------------
        let client_endpoint = Endpoint::builder()
            .secret_key(config.client_secret_key.clone())
            .alpns(vec![ALPN.to_vec()])
            .bind()
            .await?;

        client_endpoint.online().await;

        // Connect client endpoint -> server endpoint
        let conn = client_endpoint
            .connect(server.endpoint.addr(), ALPN)
            .await?;

        let profiles = ProfilesClient::new(RpcClient::new(conn.clone()).await?);
        let forum = ForumClient::new(RpcClient::new(conn.clone()).await?);
        let counseling = CounselingClient::new(RpcClient::new(conn).await?);

        tracing::info!("solace core online");

        Ok(Self {
            config,
            server,
            client_endpoint,
            profiles,
            forum,
            counseling,
        })
    }

    pub async fn shutdown(self) -> Result<(), Box<dyn std::error::Error>> {
        // Close client endpoint
        self.client_endpoint.close().await;

        // Shutdown server bundle
        self.server.shutdown(Duration::from_secs(5)).await?;
        tracing::info!("solace core stopped");
        Ok(())
    }
}

pub mod prelude {
    pub use super::booking;
    pub use super::config;
    pub use super::entity;
    pub use super::forum;
    pub use super::ids;
    pub use super::models;
    pub use super::session::Session;
    pub use super::thread;

    pub use super::service;

    pub use super::error;

    pub use zel_core;
}
