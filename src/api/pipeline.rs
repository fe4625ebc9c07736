//! Bearer-token request pipeline with single-flight token refresh.
//!
//! Every request carries the current access token. The first 401 seen while the
//! pipeline is idle starts a refresh; requests that hit 401 while that refresh is in
//! flight wait for its outcome instead of starting their own. Each request is retried
//! at most once, with the token the refresh produced. A rejected refresh clears the
//! stored credentials and fails every waiting request with the refresh error.

use super::error::ApiError;
use super::tokens::{Credentials, TokenStore, load_credentials, save_credentials};
use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::model::TokenPair;
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

pub const REFRESH_PATH: &str = "/auth/token/refresh/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

type Waiter = oneshot::Sender<Result<String, ApiError>>;

/// Shared pipeline state. Only touched under its mutex and never across an await.
#[derive(Debug)]
pub struct PipelineState {
    pub phase: RefreshPhase,
    pending: Vec<Waiter>,
    pub credentials: Credentials,
}

impl PipelineState {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            phase: RefreshPhase::Idle,
            pending: Vec::new(),
            credentials,
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: Option<String>,
}

enum Ticket {
    /// This caller owns the refresh call.
    Leader { refresh: String, guard: RefreshGuard },
    /// A refresh is already in flight; wait for its outcome.
    Follower(oneshot::Receiver<Result<String, ApiError>>),
    /// Nothing to refresh with.
    NoCredential,
}

#[derive(Clone)]
pub struct AuthPipeline {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    state: Arc<Mutex<PipelineState>>,
}

impl AuthPipeline {
    /// Build a pipeline whose credentials start from `store`.
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        let credentials = load_credentials(store.as_ref());
        let state = Arc::new(Mutex::new(PipelineState::new(credentials)));
        Self::with_state(transport, store, state)
    }

    pub fn with_state(
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        state: Arc<Mutex<PipelineState>>,
    ) -> Self {
        Self {
            transport,
            store,
            state,
        }
    }

    pub fn phase(&self) -> RefreshPhase {
        self.lock_state().phase
    }

    pub fn pending_requests(&self) -> usize {
        self.lock_state().pending_len()
    }

    pub fn credentials(&self) -> Credentials {
        self.lock_state().credentials.clone()
    }

    pub fn set_credentials(&self, pair: &TokenPair) {
        let credentials = Credentials::new(pair.access.clone(), pair.refresh.clone());
        self.lock_state().credentials = credentials.clone();
        save_credentials(self.store.as_ref(), &credentials);
    }

    pub fn clear_credentials(&self) {
        self.lock_state().credentials = Credentials::default();
        save_credentials(self.store.as_ref(), &Credentials::default());
    }

    /// Send without a token and without the refresh path (login, registration).
    pub async fn send_public(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.transport
            .send(&request.with_bearer(None))
            .await?
            .into_result()
    }

    /// Send with the current access token, refreshing and retrying once on 401.
    ///
    /// A 401 for a token that has since been replaced is retried with the stored token
    /// directly; only a 401 for the current token starts or joins a refresh.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let sent = self.access_token();
        let first = self
            .transport
            .send(&request.clone().with_bearer(sent.clone()))
            .await?;
        if first.status != 401 {
            return first.into_result();
        }

        debug!(path = %request.path, "access token rejected");
        let token = match self.access_token() {
            Some(current) if sent.as_ref() != Some(&current) => {
                debug!(path = %request.path, "token replaced while request was in flight");
                current
            }
            _ => match self.refreshed_token().await {
                Some(outcome) => outcome?,
                None => return first.into_result(),
            },
        };

        let retried = self
            .transport
            .send(&request.clone().with_bearer(Some(token)))
            .await?;
        if retried.status == 401 {
            warn!(path = %request.path, "request rejected again after token refresh");
        }
        retried.into_result()
    }

    /// Refresh the access token now, joining a refresh already in flight.
    pub async fn refresh_now(&self) -> Result<String, ApiError> {
        self.refreshed_token()
            .await
            .unwrap_or_else(|| Err(ApiError::Refresh(Box::new(missing_refresh_token()))))
    }

    fn access_token(&self) -> Option<String> {
        self.lock_state().credentials.access.clone()
    }

    // `None` when there is no refresh credential to use.
    async fn refreshed_token(&self) -> Option<Result<String, ApiError>> {
        match self.take_ticket() {
            Ticket::NoCredential => {
                debug!("no refresh token stored; not refreshing");
                None
            }
            Ticket::Follower(receiver) => {
                debug!("waiting on in-flight token refresh");
                Some(receiver.await.unwrap_or(Err(ApiError::RefreshAborted)))
            }
            Ticket::Leader { refresh, guard } => {
                let outcome = self.call_refresh(&refresh).await;
                self.settle(guard, &outcome);
                Some(outcome)
            }
        }
    }

    fn take_ticket(&self) -> Ticket {
        let mut state = self.lock_state();
        match state.phase {
            RefreshPhase::Refreshing => {
                let (sender, receiver) = oneshot::channel();
                state.pending.push(sender);
                Ticket::Follower(receiver)
            }
            RefreshPhase::Idle => match state.credentials.refresh.clone() {
                None => Ticket::NoCredential,
                Some(refresh) => {
                    state.phase = RefreshPhase::Refreshing;
                    Ticket::Leader {
                        refresh,
                        guard: RefreshGuard {
                            state: Arc::clone(&self.state),
                            settled: false,
                        },
                    }
                }
            },
        }
    }

    async fn call_refresh(&self, refresh: &str) -> Result<String, ApiError> {
        info!("refreshing access token");
        let request = ApiRequest::post(REFRESH_PATH, serde_json::json!({ "refresh": refresh }));
        let response = self
            .transport
            .send(&request)
            .await
            .and_then(ApiResponse::into_result)
            .map_err(|err| ApiError::Refresh(Box::new(err)))?;
        let body: RefreshResponse = response
            .json()
            .map_err(|err| ApiError::Refresh(Box::new(err)))?;
        body.access
            .ok_or_else(|| ApiError::Refresh(Box::new(ApiError::MissingAccessToken)))
    }

    fn settle(&self, mut guard: RefreshGuard, outcome: &Result<String, ApiError>) {
        let (waiters, credentials) = {
            let mut state = self.lock_state();
            state.phase = RefreshPhase::Idle;
            match outcome {
                Ok(access) => state.credentials.access = Some(access.clone()),
                // The server answered 2xx but gave no usable token; keep the session.
                Err(ApiError::Refresh(inner)) if **inner == ApiError::MissingAccessToken => {}
                Err(_) => state.credentials = Credentials::default(),
            }
            (std::mem::take(&mut state.pending), state.credentials.clone())
        };
        guard.settled = true;
        save_credentials(self.store.as_ref(), &credentials);

        match outcome {
            Ok(_) => info!(queued = waiters.len(), "access token refreshed"),
            Err(err) => warn!(queued = waiters.len(), %err, "token refresh failed"),
        }
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PipelineState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<PipelineState>) -> MutexGuard<'_, PipelineState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn missing_refresh_token() -> ApiError {
    ApiError::Unauthorized {
        body: "no refresh token stored".to_string(),
    }
}

/// Returns the pipeline to idle if the refreshing caller is dropped mid-flight.
/// Dropping the queued senders wakes every waiter with `RefreshAborted`.
struct RefreshGuard {
    state: Arc<Mutex<PipelineState>>,
    settled: bool,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = lock(&self.state);
        state.phase = RefreshPhase::Idle;
        let abandoned = std::mem::take(&mut state.pending);
        warn!(queued = abandoned.len(), "token refresh abandoned");
    }
}
