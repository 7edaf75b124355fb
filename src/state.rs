use std::sync::Arc;

use crate::{
    config::Config,
    db::{mongo::MongoStore, Store},
    salla::SallaClient,
    services::notifier::Notifier,
};

pub struct AppState {
    pub cfg: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub salla: Arc<SallaClient>,
    pub notifier: Notifier,
}

impl AppState {
    pub async fn new(cfg: Config) -> mongodb::error::Result<Self> {
        let store = MongoStore::connect(&cfg).await?;
        Ok(Self {
            salla: Arc::new(SallaClient::new(&cfg)),
            notifier: Notifier::new(&cfg),
            store: Arc::new(store),
            cfg: Arc::new(cfg),
        })
    }
}
