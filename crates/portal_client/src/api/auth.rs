use portal_core::{RegistrationResponse, TokenResponse, UserRecord};
use serde::Serialize;

use crate::error::Result;
use crate::gateway::{ApiRequest, Gateway};

pub const TOKEN_PATH: &str = "/auth/token";
pub const REGISTER_PATH: &str = "/auth/register";
pub const ME_PATH: &str = "/auth/me";

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    full_name: &'a str,
    email: &'a str,
    password: &'a str,
}

impl Gateway {
    /// OAuth2 password exchange. The token endpoint takes a form body, not JSON.
    pub async fn token_exchange(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let request = ApiRequest::post(TOKEN_PATH)
            .form([("username", username), ("password", password)])
            .public();
        self.fetch(request).await
    }

    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegistrationResponse> {
        let body = RegisterBody {
            full_name,
            email,
            password,
        };
        self.fetch(ApiRequest::post(REGISTER_PATH).json_body(&body).public())
            .await
    }

    pub async fn current_user(&self) -> Result<UserRecord> {
        self.get(ME_PATH).await
    }
}
