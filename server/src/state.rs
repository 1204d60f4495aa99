use std::sync::Arc;

use redis::aio::ConnectionManager;
use reqwest::Client;

use roster::store::init_redis;

use super::config::Config;

pub struct AppState {
    pub config: Config,
    pub clawback_connection: ConnectionManager,
    pub prices_connection: ConnectionManager,
    pub http_client: Client,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let clawback_connection = init_redis(&config.clawback_redis_url).await;
        let prices_connection = init_redis(&config.prices_redis_url).await;

        Arc::new(Self {
            config,
            clawback_connection,
            prices_connection,
            http_client: Client::new(),
        })
    }
}
