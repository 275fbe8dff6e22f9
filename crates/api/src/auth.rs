//! Authentication and profile endpoints

use classmatch_core::{ProfileUpdate, SignupRequest, UserProfile};
use serde_json::Value;
use tracing::{info, instrument};

use crate::client::ApiClient;
use crate::error::Result;
use crate::protocol::{AuthResponse, LoginRequest};

impl ApiClient {
    /// `POST /auth/login`; keeps the returned token for later calls
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let response: AuthResponse = self
            .post("/auth/login", &LoginRequest { email, password })
            .await?;
        self.accept_auth(response)
    }

    /// `POST /auth/signup`; keeps the returned token for later calls
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<UserProfile> {
        let response: AuthResponse = self.post("/auth/signup", request).await?;
        self.accept_auth(response)
    }

    /// `POST /auth/logout`, then forget the token
    pub async fn logout(&self) -> Result<()> {
        let _: Value = self.post_empty("/auth/logout").await?;
        self.clear_token()?;
        info!("Logged out of backend");
        Ok(())
    }

    /// `GET /auth/me`
    pub async fn current_user(&self) -> Result<UserProfile> {
        self.get("/auth/me").await
    }

    /// `PATCH /users/profile`
    pub async fn update_profile(&self, updates: &ProfileUpdate) -> Result<UserProfile> {
        self.patch("/users/profile", updates).await
    }

    /// `GET /users/:id`
    pub async fn user_profile(&self, user_id: i64) -> Result<UserProfile> {
        self.get(&format!("/users/{}", user_id)).await
    }

    fn accept_auth(&self, response: AuthResponse) -> Result<UserProfile> {
        if let Some(token) = &response.token {
            self.store_token(token)?;
        }
        Ok(response.user)
    }
}
