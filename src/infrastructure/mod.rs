pub mod config;
pub mod database;
pub mod metrics;
pub mod password;
pub mod rate_limiter;
pub mod resident_csv;
pub mod telemetry;
pub mod token_service;
pub mod upload_store;

pub use token_service::{JwtTokenService, TokenService};
pub use upload_store::{StoredUpload, UploadStore};
