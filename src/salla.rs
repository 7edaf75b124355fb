use async_trait::async_trait;
use serde::Deserialize;

use crate::{config::Config, errors::AppError, models::oauth_token::OauthGrant};

/// Seam between the token lifecycle and the provider's token endpoint.
#[async_trait]
pub trait TokenRefresher: Send + Sync + 'static {
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<OauthGrant, AppError>;
}

/// Resource-owner profile returned by the accounts API after authorization.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceOwner {
    pub name: String,
    pub email: String,
    pub merchant: MerchantInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchantInfo {
    pub id: i64,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    data: ResourceOwner,
}

pub struct SallaClient {
    http: reqwest::Client,
    accounts_base: String,
    api_base: String,
    client_id: String,
    client_secret: String,
    redirect_uri: Option<String>,
}

impl SallaClient {
    pub fn new(cfg: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            accounts_base: cfg.salla_accounts_base.clone(),
            api_base: cfg.salla_api_base.clone(),
            client_id: cfg.salla_client_id.clone(),
            client_secret: cfg.salla_client_secret.clone(),
            redirect_uri: cfg.salla_redirect_uri.clone(),
        }
    }

    /// Exchanges an authorization code for the initial token pair.
    pub async fn exchange_authorization_code(&self, code: &str) -> Result<OauthGrant, AppError> {
        let mut form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
        ];
        if let Some(uri) = &self.redirect_uri {
            form.push(("redirect_uri", uri.clone()));
        }

        let resp = self
            .http
            .post(format!("{}/oauth2/token", self.accounts_base))
            .form(&form)
            .send()
            .await?;
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("code exchange failed: {body}")));
        }
        Ok(resp.json().await?)
    }

    pub async fn get_resource_owner(&self, access_token: &str) -> Result<ResourceOwner, AppError> {
        let resp = self
            .http
            .get(format!("{}/oauth2/user/info", self.accounts_base))
            .bearer_auth(access_token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "user info request failed: {}",
                resp.status()
            )));
        }
        let info: UserInfoResponse = resp.json().await?;
        Ok(info.data)
    }

    /// Fetches the store's orders; used by the account API once a valid
    /// access token is in hand.
    pub async fn get_all_orders(&self, access_token: &str) -> Result<serde_json::Value, AppError> {
        let resp = self
            .http
            .get(format!("{}/orders", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "orders request failed: {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    pub async fn get_all_customers(
        &self,
        access_token: &str,
    ) -> Result<serde_json::Value, AppError> {
        let resp = self
            .http
            .get(format!("{}/customers", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "customers request failed: {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl TokenRefresher for SallaClient {
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<OauthGrant, AppError> {
        let form = [
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
        ];

        let resp = self
            .http
            .post(format!("{}/oauth2/token", self.accounts_base))
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::TokenRefreshFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::TokenRefreshFailed(body));
        }
        resp.json()
            .await
            .map_err(|e| AppError::TokenRefreshFailed(e.to_string()))
    }
}
