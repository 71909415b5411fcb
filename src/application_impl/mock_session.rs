use crate::application_impl::SessionStore;
use crate::domain_model::AccessToken;
use crate::infra_memory::MockBackendError;
use std::future::Future;
use tracing::warn;

/// Runs a mock backend call with the stored access token.
///
/// An `Unauthorized` answer clears the session, the same way the HTTP
/// adapter reacts to a 401.
pub(crate) async fn with_session<T, F, Fut>(
    session: &SessionStore,
    call: F,
) -> Result<T, MockBackendError>
where
    F: FnOnce(Option<AccessToken>) -> Fut,
    Fut: Future<Output = Result<T, MockBackendError>>,
{
    let token = session.access_token().await;
    let had_token = token.is_some();
    let result = call(token).await;
    if had_token && matches!(result, Err(MockBackendError::Unauthorized)) {
        warn!("access token rejected by mock backend, clearing session");
        session.clear().await;
    }
    result
}
