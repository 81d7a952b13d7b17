// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared wiring for the CLI: storage, rate limiter, and platform clients
//! built once from the loaded configuration.

use std::sync::Arc;

use ludex_config::LudexConfig;
use ludex_core::{LudexError, Platform, PlatformClient};
use ludex_epic::EpicClient;
use ludex_psn::PsnClient;
use ludex_ratelimit::SlidingWindowLimiter;
use ludex_steam::SteamClient;
use ludex_storage::SqliteStore;
use ludex_sync::SyncOrchestrator;
use ludex_xbox::XboxClient;

/// Everything a subcommand needs, built from config at startup.
pub struct App {
    pub config: LudexConfig,
    pub store: Arc<SqliteStore>,
    steam: Option<Arc<SteamClient>>,
    psn: Arc<PsnClient>,
    xbox: Arc<XboxClient>,
    epic: Arc<EpicClient>,
}

impl App {
    pub async fn build(config: LudexConfig) -> Result<Self, LudexError> {
        let store = Arc::new(SqliteStore::open(&config.storage.database_path).await?);
        let limiter = Arc::new(SlidingWindowLimiter::new());

        // Steam is the only client with an app-level prerequisite; without
        // an API key it simply stays unavailable.
        let steam = match &config.steam.api_key {
            Some(api_key) => Some(Arc::new(SteamClient::new(api_key.clone(), limiter.clone())?)),
            None => None,
        };
        let psn = Arc::new(PsnClient::new(limiter.clone())?);
        let xbox = Arc::new(XboxClient::new(config.xbox.base_url.clone(), limiter.clone())?);
        let epic = Arc::new(EpicClient::new(
            config.epic.client_id.clone(),
            config.epic.client_secret.clone(),
            config.epic.page_delay_ms,
            limiter,
        )?);

        Ok(Self {
            config,
            store,
            steam,
            psn,
            xbox,
            epic,
        })
    }

    /// The client for one platform, as a trait object.
    pub fn client(&self, platform: Platform) -> Result<Arc<dyn PlatformClient>, LudexError> {
        match platform {
            Platform::Steam => self
                .steam
                .clone()
                .map(|c| c as Arc<dyn PlatformClient>)
                .ok_or_else(|| {
                    LudexError::Config(
                        "steam requires `steam.api_key` in ludex.toml or LUDEX_STEAM_API_KEY"
                            .into(),
                    )
                }),
            Platform::Psn => Ok(self.psn.clone()),
            Platform::Xbox => Ok(self.xbox.clone()),
            Platform::Epic => Ok(self.epic.clone()),
        }
    }

    /// Concrete PSN client, for the NPSSO link exchange.
    pub fn psn(&self) -> &PsnClient {
        &self.psn
    }

    /// Concrete Epic client, for the authorization-code link exchange.
    pub fn epic(&self) -> &EpicClient {
        &self.epic
    }

    /// A sync orchestrator over every available client.
    pub fn orchestrator(&self) -> SyncOrchestrator {
        let mut orchestrator = SyncOrchestrator::with_refresh_buffer(
            self.store.clone(),
            self.store.clone(),
            self.config.psn.refresh_buffer_secs as i64,
        );
        if let Some(steam) = &self.steam {
            orchestrator.register_client(steam.clone());
        }
        orchestrator.register_client(self.psn.clone());
        orchestrator.register_client(self.xbox.clone());
        orchestrator.register_client(self.epic.clone());
        orchestrator
    }
}
