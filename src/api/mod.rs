use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use std::str::FromStr;
use uuid::Uuid;

pub mod compare;
pub mod conversations;

const X_USER_ID: &str = "X-User-ID";

/// Caller identification. Authentication proper happens upstream; by the
/// time a request gets here the header is trusted, it only has to be
/// present and well formed.
#[derive(Debug)]
pub struct ExtractUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, (StatusCode, &'static str)> {
        let Some(user_id) = parts.headers.get(X_USER_ID) else {
            return Err((StatusCode::UNAUTHORIZED, "`X-User-ID` header is missing"));
        };

        let user_id = user_id
            .to_str()
            .map_err(|_| (StatusCode::BAD_REQUEST, "invalid user id"))?;
        let user_id =
            Uuid::from_str(user_id).map_err(|_| (StatusCode::BAD_REQUEST, "invalid user id"))?;
        Ok(ExtractUser(user_id))
    }
}
