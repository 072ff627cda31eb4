use crate::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Validate JWT signature and extract claims (HS256).
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

/// Resolve a bearer token to the caller's user id.
pub fn resolve_user(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let claims = verify_jwt(token, secret)?;
    Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)
}

/// Middleware: extract the bearer JWT and add the caller's id to extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, AppError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let user_id = resolve_user(token, &state.config.jwt_secret)?;
    req.extensions_mut().insert(user_id);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: i64,
    }

    fn token_for(sub: &str, secret: &str) -> String {
        let claims = TestClaims {
            sub: sub.to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_resolves_user() {
        let user = Uuid::new_v4();
        let token = token_for(&user.to_string(), "s3cret");
        assert_eq!(resolve_user(&token, "s3cret").unwrap(), user);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = token_for(&Uuid::new_v4().to_string(), "s3cret");
        assert!(matches!(
            resolve_user(&token, "other"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn non_uuid_subject_is_unauthorized() {
        let token = token_for("not-a-uuid", "s3cret");
        assert!(matches!(
            resolve_user(&token, "s3cret"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let claims = TestClaims {
            sub: Uuid::new_v4().to_string(),
            exp: chrono::Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();
        assert!(matches!(
            resolve_user(&token, "s3cret"),
            Err(AppError::Unauthorized)
        ));
    }
}
