//! REST access to the family tree service.

mod client;
mod error;
mod pipeline;
mod tokens;
mod transport;

pub use client::FamilyApi;
pub use error::ApiError;
pub use pipeline::{AuthPipeline, PipelineState, REFRESH_PATH, RefreshPhase};
pub use tokens::{
    ACCESS_TOKEN_KEY, Credentials, FileTokenStore, MemoryTokenStore, REFRESH_TOKEN_KEY,
    TokenStore, load_credentials, save_credentials,
};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
