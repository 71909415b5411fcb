use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_fs::FileKeyValueStore;
use crate::infra_http::{ApiClient, ApiConfig};
use crate::infra_memory::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Duration;

/// Composition root: one session store shared by every service, and one
/// backend family selected by `client.backend`.
pub struct Client {
    pub session: Arc<SessionStore>,
    pub auth_service: Arc<dyn AuthService>,
    pub connection_service: Arc<dyn ConnectionService>,
    pub profile_service: Arc<dyn ProfileService>,
    pub post_service: Arc<dyn PostService>,
}

impl Client {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let storage: Arc<dyn KeyValueStore> = match settings.session.storage.as_str() {
            "file" => Arc::new(FileKeyValueStore::new(&settings.session.path)),
            "memory" => Arc::new(MemoryKeyValueStore::new()),
            other => return Err(anyhow::anyhow!("Unknown session storage: {}", other)),
        };
        Self::with_storage(settings, storage).await
    }

    pub async fn with_storage(
        settings: &Settings,
        storage: Arc<dyn KeyValueStore>,
    ) -> anyhow::Result<Self> {
        let session = Arc::new(SessionStore::new(storage));

        match settings.client.backend.as_str() {
            "api" => {
                let config = ApiConfig {
                    base_url: settings.api.base_url.clone(),
                    timeout: Duration::from_secs(settings.api.timeout_secs),
                };
                info!(base_url = %config.base_url, "using api backend");
                Ok(Self::api(&config, session)?)
            }
            "mock" => {
                let config = MockBackendConfig {
                    latency: Duration::from_millis(settings.mock.latency_ms),
                    signing_key: settings.mock.signing_key.clone().into_bytes(),
                    ..MockBackendConfig::default()
                };
                info!("using mock backend");
                let backend = Arc::new(MockBackend::seeded(config).await?);
                Ok(Self::mock(backend, session))
            }
            other => Err(anyhow::anyhow!("Unknown client backend: {}", other)),
        }
    }

    pub fn api(config: &ApiConfig, session: Arc<SessionStore>) -> anyhow::Result<Self> {
        let client = Arc::new(ApiClient::new(config, session.clone())?);
        Ok(Self {
            auth_service: Arc::new(ApiAuthService::new(client.clone(), session.clone())),
            connection_service: Arc::new(ApiConnectionService::new(client.clone())),
            profile_service: Arc::new(ApiProfileService::new(client.clone())),
            post_service: Arc::new(ApiPostService::new(client)),
            session,
        })
    }

    pub fn mock(backend: Arc<MockBackend>, session: Arc<SessionStore>) -> Self {
        Self {
            auth_service: Arc::new(MockAuthService::new(backend.clone(), session.clone())),
            connection_service: Arc::new(MockConnectionService::new(
                backend.clone(),
                session.clone(),
            )),
            profile_service: Arc::new(MockProfileService::new(backend.clone(), session.clone())),
            post_service: Arc::new(MockPostService::new(backend, session.clone())),
            session,
        }
    }
}
