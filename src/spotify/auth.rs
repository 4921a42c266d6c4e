use async_trait::async_trait;
use reqwest::{Client, header};

use crate::{config, error::AuthFailure, types::TokenGrant, utils};

/// The two token-acquisition flows against the accounts service.
///
/// Behind a trait so the token lifecycle can be exercised without network
/// access; the production implementation is [`AccountsClient`].
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Exchanges a single-use authorization code for a token pair. Never
    /// retried automatically; a rejected code means the login attempt is
    /// over and the user must restart at `/login`.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthFailure>;

    /// Exchanges a refresh token for a new access token (and possibly a
    /// rotated refresh token). Retried by the caller within bounds.
    async fn exchange_refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthFailure>;
}

/// Token endpoint client authenticating with HTTP Basic credentials built
/// from the client id and secret, as the accounts service requires for
/// confidential clients.
pub struct AccountsClient {
    http: Client,
}

impl AccountsClient {
    pub fn new() -> Self {
        AccountsClient {
            http: Client::new(),
        }
    }

    async fn post_grant(&self, params: &[(&str, &str)]) -> Result<TokenGrant, String> {
        let credentials = utils::basic_auth_header(
            &config::spotify_client_id(),
            &config::spotify_client_secret(),
        );

        let res = self
            .http
            .post(config::spotify_apitoken_url())
            .header(header::AUTHORIZATION, credentials)
            .form(params)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = res.status();
        if !status.is_success() {
            return Err(status.to_string());
        }

        res.json::<TokenGrant>().await.map_err(|e| e.to_string())
    }
}

impl Default for AccountsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenExchange for AccountsClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthFailure> {
        let redirect_uri = config::spotify_redirect_uri();
        self.post_grant(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .await
        .map_err(AuthFailure::ExchangeRejected)
    }

    async fn exchange_refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthFailure> {
        self.post_grant(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
        .map_err(AuthFailure::RefreshDenied)
    }
}
