use crate::{config::AppConfig, ml_client::MlClient, user_store::UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub ml_client: MlClient,
    pub users: UserStore,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Self {
        let ml_client = MlClient::from_config(&config);
        Self {
            config,
            ml_client,
            users: UserStore::seeded(),
        }
    }
}
