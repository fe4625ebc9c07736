use super::error::ApiError;
use super::pipeline::AuthPipeline;
use super::tokens::{FileTokenStore, MemoryTokenStore, TokenStore};
use super::transport::{ApiRequest, HttpTransport, Transport};
use crate::config::ApiConfig;
use crate::model::{
    FamilyUpdate, LoginRequest, Member, MemberId, NewFamilyUpdate, NewTree, Notification,
    RegisterRequest, TokenPair, Tree, UserProfile,
};
use crate::parser::members_from_value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// Typed client for the family tree REST API.
#[derive(Clone)]
pub struct FamilyApi {
    pipeline: AuthPipeline,
}

impl FamilyApi {
    pub fn new(pipeline: AuthPipeline) -> Self {
        Self { pipeline }
    }

    /// HTTP transport plus a file-backed token store when `token_file` is set.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config)?);
        let store: Arc<dyn TokenStore> = match &config.token_file {
            Some(path) => Arc::new(FileTokenStore::open(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Ok(Self::new(AuthPipeline::new(transport, store)))
    }

    pub fn pipeline(&self) -> &AuthPipeline {
        &self.pipeline
    }

    pub fn is_logged_in(&self) -> bool {
        !self.pipeline.credentials().is_empty()
    }

    // auth

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, ApiError> {
        let response = self
            .pipeline
            .send_public(ApiRequest::post("/auth/register/", to_value(request)?))
            .await?;
        response.json()
    }

    /// Exchange a username and password for a token pair and keep it.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let body = to_value(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let pair: TokenPair = self
            .pipeline
            .send_public(ApiRequest::post("/auth/token/", body))
            .await?
            .json()?;
        self.pipeline.set_credentials(&pair);
        tracing::info!(username, "logged in");
        Ok(pair)
    }

    pub async fn refresh_access_token(&self) -> Result<String, ApiError> {
        self.pipeline.refresh_now().await
    }

    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get("/auth/me/").await
    }

    pub fn logout(&self) {
        self.pipeline.clear_credentials();
    }

    // trees

    pub async fn trees(&self) -> Result<Vec<Tree>, ApiError> {
        self.list("/trees/").await
    }

    pub async fn tree(&self, id: u64) -> Result<Tree, ApiError> {
        self.get(&format!("/trees/{id}/")).await
    }

    pub async fn create_tree(&self, name: &str) -> Result<Tree, ApiError> {
        let body = NewTree {
            name: name.to_string(),
        };
        self.post("/trees/", &body).await
    }

    pub async fn update_tree(&self, id: u64, name: &str) -> Result<Tree, ApiError> {
        let body = NewTree {
            name: name.to_string(),
        };
        self.put(&format!("/trees/{id}/"), &body).await
    }

    pub async fn delete_tree(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("/trees/{id}/")).await
    }

    /// All members of one tree, ready for the graph builder.
    pub async fn tree_members(&self, id: u64) -> Result<Vec<Member>, ApiError> {
        let value: Value = self.get(&format!("/trees/{id}/members/")).await?;
        members_from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
    }

    // members

    pub async fn members(&self) -> Result<Vec<Member>, ApiError> {
        self.list("/members/").await
    }

    pub async fn member(&self, id: MemberId) -> Result<Member, ApiError> {
        self.get(&format!("/members/{id}/")).await
    }

    pub async fn create_member(&self, member: &Member) -> Result<Member, ApiError> {
        self.post("/members/", member).await
    }

    pub async fn update_member(&self, member: &Member) -> Result<Member, ApiError> {
        self.put(&format!("/members/{}/", member.id), member).await
    }

    pub async fn delete_member(&self, id: MemberId) -> Result<(), ApiError> {
        self.delete(&format!("/members/{id}/")).await
    }

    // notifications

    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.list("/notifications/").await
    }

    pub async fn mark_notification_read(&self, id: u64) -> Result<Notification, ApiError> {
        self.put(&format!("/notifications/{id}/"), &json!({ "read": true }))
            .await
    }

    // updates

    pub async fn updates(&self) -> Result<Vec<FamilyUpdate>, ApiError> {
        self.list("/updates/").await
    }

    pub async fn create_update(&self, update: &NewFamilyUpdate) -> Result<FamilyUpdate, ApiError> {
        self.post("/updates/", update).await
    }

    pub async fn delete_update(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("/updates/{id}/")).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.pipeline.send(ApiRequest::get(path)).await?.json()
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.pipeline
            .send(ApiRequest::post(path, to_value(body)?))
            .await?
            .json()
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.pipeline
            .send(ApiRequest::put(path, to_value(body)?))
            .await?
            .json()
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.pipeline.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let listing: Listing<T> = self.get(path).await?;
        Ok(listing.into_items())
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    Ok(serde_json::to_value(value)?)
}

/// List endpoints answer with either a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Items(Vec<T>),
    Page { results: Vec<T> },
}

impl<T> Listing<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Listing::Items(items) | Listing::Page { results: items } => items,
        }
    }
}
