use crate::config::Config;
use crate::remote::{CongressApi, FecApi, HttpClient, LegislatorsApi};
use crate::service::{CongressService, DonationsService, MemberService, ProxyService};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Services shared by every request; each owns its own caches.
pub struct AppState {
    pub congress: CongressService,
    pub members: MemberService,
    pub donations: DonationsService,
    pub proxy: ProxyService,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let http = HttpClient::new(config.timeout()).context("Failed to build HTTP client")?;

        let congress_api = CongressApi::new(
            http.clone(),
            &config.congress.base_url,
            config.congress.api_key.clone(),
        );
        let fec_api = FecApi::new(http.clone(), &config.fec.base_url, config.fec.api_key.clone());
        let legislators = LegislatorsApi::new(http, &config.congress.legislators_url);

        Ok(Arc::new(Self {
            congress: CongressService::new(
                congress_api.clone(),
                legislators,
                config.congress.clone(),
            ),
            members: MemberService::new(
                congress_api.clone(),
                fec_api.clone(),
                &config.congress,
                &config.fec,
            ),
            donations: DonationsService::new(fec_api.clone(), config.fec.clone()),
            proxy: ProxyService::new(congress_api, fec_api, config.fec.proxy_ttl()),
            config,
        }))
    }
}
