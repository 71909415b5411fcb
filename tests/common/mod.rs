//! Shared fixtures for the integration tests.
#![allow(dead_code)]

pub mod stub_api;

use connectly::application_impl::SessionStore;
use connectly::client::Client;
use connectly::domain_model::*;
use connectly::infra_http::ApiConfig;
use connectly::infra_memory::{
    MemoryKeyValueStore, MockBackend, MockBackendConfig, SEED_PASSWORD,
};
use std::sync::Arc;
use std::time::Duration;
use stub_api::StubApi;

pub const JOHN: &str = "1";
pub const JANE: &str = "2";
pub const ALICE: &str = "3";
pub const BOB: &str = "4";

pub fn mobile_of(id: &str) -> String {
    match id {
        JOHN => "+1234567890",
        JANE => "+1234567891",
        ALICE => "+1234567892",
        BOB => "+1234567893",
        other => panic!("no seed user {other}"),
    }
    .to_string()
}

pub fn seed_login(id: &str) -> LoginInput {
    LoginInput {
        mobile: mobile_of(id),
        password: SEED_PASSWORD.to_string(),
    }
}

/// A client wired to its own in-memory session storage.
pub struct TestClient {
    pub client: Client,
    pub storage: Arc<MemoryKeyValueStore>,
}

impl TestClient {
    pub async fn login(&self, id: &str) -> User {
        self.client
            .auth_service
            .login(seed_login(id))
            .await
            .expect("seed login")
    }

    pub async fn session(&self) -> Session {
        self.client.session.get().await
    }
}

pub async fn seeded_backend() -> Arc<MockBackend> {
    Arc::new(
        MockBackend::seeded(MockBackendConfig::default())
            .await
            .expect("seed mock backend"),
    )
}

pub fn mock_client(backend: &Arc<MockBackend>) -> TestClient {
    let storage = Arc::new(MemoryKeyValueStore::new());
    let session = Arc::new(SessionStore::new(storage.clone()));
    TestClient {
        client: Client::mock(backend.clone(), session),
        storage,
    }
}

pub fn api_client(stub: &StubApi) -> TestClient {
    let storage = Arc::new(MemoryKeyValueStore::new());
    let session = Arc::new(SessionStore::new(storage.clone()));
    let config = ApiConfig {
        base_url: stub.base_url.clone(),
        timeout: Duration::from_secs(5),
    };
    TestClient {
        client: Client::api(&config, session).expect("api client"),
        storage,
    }
}

/// Both flavours of client over the same seeded data set.
pub enum Backend {
    Mock(Arc<MockBackend>),
    Api(StubApi),
}

impl Backend {
    pub async fn mock() -> Self {
        Backend::Mock(seeded_backend().await)
    }

    pub async fn api() -> Self {
        Backend::Api(StubApi::start().await)
    }

    pub fn client(&self) -> TestClient {
        match self {
            Backend::Mock(backend) => mock_client(backend),
            Backend::Api(stub) => api_client(stub),
        }
    }

    pub async fn all() -> Vec<Backend> {
        vec![Backend::mock().await, Backend::api().await]
    }
}
