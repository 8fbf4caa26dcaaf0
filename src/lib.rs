//! Client core for the DataRepo dataset sharing platform.
//!
//! Hospitals publish and browse datasets through a REST backend; this crate
//! is everything a host shell needs short of rendering: session lifecycle
//! with persistence across restarts, route guarding, a typed resource
//! client, and per-screen view models.
//!
//! ```no_run
//! use datarepo_client::{AppCore, config::Config};
//!
//! # async fn run() -> Result<(), datarepo_client::errors::ApiError> {
//! let core = AppCore::new(Config::from_env())?;
//! let restored = core.start().await;
//! println!("restored session: {}", restored.is_some());
//! let decision = core.guard.check("/datasets");
//! println!("{decision:?}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod guard;
pub mod models;
pub mod session;
pub mod views;

use std::sync::Arc;

use client::ResourceClient;
use config::Config;
use errors::ApiError;
use guard::RouteGuard;
use models::Principal;
use session::SessionStore;

/// Everything a shell needs, wired together.
pub struct AppCore {
    pub config: Arc<Config>,
    pub client: Arc<ResourceClient>,
    pub session: Arc<SessionStore>,
    pub guard: RouteGuard,
}

impl AppCore {
    /// Assemble the core components from configuration.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let config = Arc::new(config);
        let client = Arc::new(ResourceClient::new(&config)?);
        let session = Arc::new(SessionStore::new(
            client.clone(),
            config.session_path.clone(),
        ));
        let guard = RouteGuard::new(session.clone());
        Ok(Self {
            config,
            client,
            session,
            guard,
        })
    }

    /// Resolve the startup session state. Call once before the first
    /// navigation; until it returns, the guard answers `Pending`.
    pub async fn start(&self) -> Option<Principal> {
        self.session.restore().await
    }
}
