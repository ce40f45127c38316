use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::adapter::handler::error::AppError;
use crate::domain::entity::user::{UserRole, UserView};

/// require_admin は管理者以外のリクエストを 403 で拒否する。
/// auth_middleware の内側に route_layer として重ねる。
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<UserView>()
        .ok_or_else(crate::adapter::middleware::auth::missing_token)?;

    if user.role != UserRole::Admin {
        tracing::warn!(user_id = %user.id, path = %req.uri().path(), "admin access denied");
        return Err(AppError::forbidden(
            "BRGY_AUTH_ADMIN_REQUIRED",
            "Admin access required",
        ));
    }
    Ok(next.run(req).await)
}
