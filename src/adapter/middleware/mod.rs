pub mod auth;
pub mod cors;
pub mod metrics;
pub mod rate_limit;
pub mod rbac;
