//! Client-side session: the stored token and who it belongs to.
//!
//! ```text
//! Unauthenticated --login/restore--> Loading --ok--> Authenticated
//!        ^                              |                 |
//!        +-----------failure------------+                 |
//!        +----------logout / expired token / 401----------+
//! ```

use std::sync::Arc;

use base64::prelude::*;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::watch;

use crate::client::api::ApiClient;
use crate::client::error::ClientResult;
use crate::client::state::LocalStore;
use crate::features::auth::dtos::{AuthResponseDto, LoginRequestDto, RegisterRequestDto};
use crate::features::users::dtos::{UpdateProfileDto, UserResponseDto};

#[derive(Debug, Clone, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Loading,
    Authenticated(Box<UserResponseDto>),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserResponseDto> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// `exp` claim of a JWT, read without verifying the signature
pub fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice::<ExpiryClaim>(&bytes)
        .ok()
        .map(|claim| claim.exp)
}

/// Undecodable tokens count as expired
pub fn is_token_expired(token: &str, now: i64) -> bool {
    token_expiry(token).map_or(true, |exp| exp <= now)
}

pub struct SessionStore {
    local: Arc<LocalStore>,
    state: watch::Sender<AuthState>,
}

impl SessionStore {
    pub fn new(local: Arc<LocalStore>) -> Self {
        let (state, _) = watch::channel(AuthState::Unauthenticated);
        Self { local, state }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<UserResponseDto> {
        self.state.borrow().user().cloned()
    }

    /// Stored token, or `None` after clearing it if it has expired
    pub async fn token(&self) -> Option<String> {
        let token = self.local.snapshot().await.token?;
        if is_token_expired(&token, Utc::now().timestamp()) {
            tracing::info!("Stored token has expired, clearing session");
            self.expire().await;
            return None;
        }
        Some(token)
    }

    /// Resume a previous session from the stored token
    pub async fn restore(&self, api: &ApiClient) -> ClientResult<bool> {
        if self.token().await.is_none() {
            self.state.send_replace(AuthState::Unauthenticated);
            return Ok(false);
        }

        self.state.send_replace(AuthState::Loading);
        match api.get::<UserResponseDto>("/api/auth/me").await {
            Ok(user) => {
                self.state
                    .send_replace(AuthState::Authenticated(Box::new(user)));
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Failed to restore session: {}", e);
                self.expire().await;
                Err(e)
            }
        }
    }

    pub async fn login(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> ClientResult<UserResponseDto> {
        let request = LoginRequestDto {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        self.authenticate(api.post::<_, AuthResponseDto>("/api/auth/login", &request))
            .await
    }

    pub async fn register(
        &self,
        api: &ApiClient,
        request: &RegisterRequestDto,
    ) -> ClientResult<UserResponseDto> {
        self.authenticate(api.post::<_, AuthResponseDto>("/api/auth/register", request))
            .await
    }

    async fn authenticate<F>(&self, call: F) -> ClientResult<UserResponseDto>
    where
        F: std::future::Future<Output = ClientResult<AuthResponseDto>>,
    {
        self.state.send_replace(AuthState::Loading);
        match call.await {
            Ok(auth) => self.adopt(auth).await,
            Err(e) => {
                self.state.send_replace(AuthState::Unauthenticated);
                Err(e)
            }
        }
    }

    /// Store a freshly issued token, e.g. after creating an organization
    pub async fn adopt(&self, auth: AuthResponseDto) -> ClientResult<UserResponseDto> {
        self.local
            .update(|s| s.token = Some(auth.access_token.clone()))
            .await?;
        self.state
            .send_replace(AuthState::Authenticated(Box::new(auth.user.clone())));
        tracing::info!("Signed in as {}", auth.user.email);
        Ok(auth.user)
    }

    pub async fn update_profile(
        &self,
        api: &ApiClient,
        request: &UpdateProfileDto,
    ) -> ClientResult<UserResponseDto> {
        let user: UserResponseDto = api.put("/api/users/profile", request).await?;
        self.state
            .send_replace(AuthState::Authenticated(Box::new(user.clone())));
        Ok(user)
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.local.update(|s| s.token = None).await?;
        self.state.send_replace(AuthState::Unauthenticated);
        Ok(())
    }

    /// Drop the token after a 401 or expiry; persistence failures are only logged
    pub(crate) async fn expire(&self) {
        if let Err(e) = self.local.update(|s| s.token = None).await {
            tracing::error!("Failed to clear stored token: {}", e);
        }
        self.state.send_replace(AuthState::Unauthenticated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::jwt::JwtService;
    use crate::features::auth::model::UserRole;
    use crate::shared::test_helpers::{sample_user, test_auth_config};
    use tempfile::tempdir;

    fn fake_token(exp: i64) -> String {
        let payload = BASE64_URL_SAFE_NO_PAD.encode(format!("{{\"sub\":\"u1\",\"exp\":{}}}", exp));
        format!("eyJhbGciOiJIUzI1NiJ9.{}.signature", payload)
    }

    #[test]
    fn test_expiry_is_read_from_payload() {
        assert_eq!(token_expiry(&fake_token(1_900_000_000)), Some(1_900_000_000));
        assert!(!is_token_expired(&fake_token(2_000), 1_000));
        assert!(is_token_expired(&fake_token(1_000), 1_000));
    }

    #[test]
    fn test_garbage_token_counts_as_expired() {
        assert_eq!(token_expiry("not-a-token"), None);
        assert!(is_token_expired("a.%%%.c", 0));
    }

    #[test]
    fn test_server_issued_token_decodes() {
        let jwt = JwtService::new(&test_auth_config());
        let issued = jwt.issue(&sample_user(UserRole::Dentist)).unwrap();
        let exp = token_expiry(&issued.access_token).unwrap();
        assert!(exp > Utc::now().timestamp());
    }

    #[tokio::test]
    async fn test_expired_token_is_cleared() {
        let dir = tempdir().unwrap();
        let local = Arc::new(LocalStore::open(dir.path().join("state.json")).await.unwrap());
        local
            .update(|s| s.token = Some(fake_token(1)))
            .await
            .unwrap();

        let session = SessionStore::new(Arc::clone(&local));
        assert!(session.token().await.is_none());
        assert!(local.snapshot().await.token.is_none());
        assert!(!session.state().is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let dir = tempdir().unwrap();
        let local = Arc::new(LocalStore::open(dir.path().join("state.json")).await.unwrap());
        let token = fake_token(Utc::now().timestamp() + 3600);
        local.update(|s| s.token = Some(token.clone())).await.unwrap();

        let session = SessionStore::new(Arc::clone(&local));
        assert_eq!(session.token().await, Some(token));

        session.logout().await.unwrap();
        assert!(session.token().await.is_none());
    }
}
