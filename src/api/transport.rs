use super::error::ApiError;
use crate::config::ApiConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// An outbound call, relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    /// Access token sent as `Authorization: Bearer …`; the request goes out bare when `None`.
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Map non-2xx statuses to errors.
    pub fn into_result(self) -> Result<Self, ApiError> {
        match self.status {
            s if (200..300).contains(&s) => Ok(self),
            401 => Err(ApiError::Unauthorized { body: self.body }),
            status => Err(ApiError::Status {
                status,
                body: self.body,
            }),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Performs a single HTTP exchange. Retries and token handling live above this seam.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// [`Transport`] backed by `reqwest`.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            base_url: normalize_base(&config.base_url)?,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

// `Url::join` drops the last path segment unless the base ends with a slash.
fn normalize_base(raw: &str) -> Result<Url, ApiError> {
    let mut base = raw.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(Url::parse(&base)?)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.endpoint(&request.path)?;
        let mut builder = self.client.request(request.method.into(), url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::trace!(method = ?request.method, path = %request.path, status, "api response");
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(&ApiConfig {
            base_url: base.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn joins_paths_under_the_base_path() {
        let t = transport("http://127.0.0.1:8000/api");
        assert_eq!(
            t.endpoint("/trees/3/members/").unwrap().as_str(),
            "http://127.0.0.1:8000/api/trees/3/members/"
        );
        let t = transport("https://family.example/api/");
        assert_eq!(
            t.endpoint("auth/token/").unwrap().as_str(),
            "https://family.example/api/auth/token/"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = HttpTransport::new(&ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn maps_statuses_to_errors() {
        assert!(ApiResponse::new(204, "").into_result().is_ok());
        assert_eq!(
            ApiResponse::new(401, "expired").into_result().unwrap_err(),
            ApiError::Unauthorized {
                body: "expired".to_string()
            }
        );
        assert_eq!(
            ApiResponse::new(404, "nope").into_result().unwrap_err().status(),
            Some(404)
        );
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let unit: Option<u32> = ApiResponse::new(204, "").json().unwrap();
        assert_eq!(unit, None);
    }
}
