//! HTTP client implementation for the Orangetheory in-studio API.
//!
//! This module provides a reqwest-based implementation of the [`OtfApi`](crate::OtfApi) trait.
//! Authentication goes through AWS Cognito (`USER_PASSWORD_AUTH` flow); the
//! resulting IdToken is sent verbatim in the `Authorization` header of the
//! two data fetches.

use crate::config::Config;
use crate::{OtfApi, OtfError, RawMember, WorkoutsPayload};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

/// Public Cognito app client id of the OTF member portal.
const COGNITO_CLIENT_ID: &str = "65knvqta6p37efc2l3eh26pl5o";

/// The endpoints reject requests that do not look like the member portal,
/// so the data fetches carry its origin and referer.
const PORTAL_ORIGIN: &str = "https://otlive.orangetheory.com";
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/103.0.0.0 Safari/537.36";

/// Client for the Orangetheory in-studio API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestOtfClient {
    auth_url: String,
    api_base_url: String,
    email: String,
    password: SecretString,
    client: reqwest::Client,
}

impl ReqwestOtfClient {
    /// Create a new client instance from a [`Config`].
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            auth_url: config.auth_url.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            password: config.password.clone(),
            client,
        }
    }

    /// Build an authenticated GET request against the data API.
    fn get_request(&self, url: &str, token: &SecretString) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Content-Type", "application/json")
            .header("Authorization", token.expose_secret())
            .header("Accept", "application/json")
            .header("Origin", PORTAL_ORIGIN)
            .header("Referer", PORTAL_ORIGIN)
            .header("User-Agent", USER_AGENT)
    }

    /// Handle a response, converting status codes to appropriate errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, OtfError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(resp: reqwest::Response) -> OtfError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            400 | 401 | 403 => OtfError::Auth(body_snippet),
            _ => OtfError::Api {
                status,
                body: body_snippet,
            },
        }
    }
}

#[async_trait]
impl OtfApi for ReqwestOtfClient {
    async fn authenticate(&self) -> Result<SecretString, OtfError> {
        let body = json!({
            "AuthParameters": {
                "USERNAME": self.email,
                "PASSWORD": self.password.expose_secret(),
            },
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": COGNITO_CLIENT_ID,
        });

        let resp = self
            .client
            .post(&self.auth_url)
            .header("Content-Type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", "AWSCognitoIdentityProviderService.InitiateAuth")
            .body(body.to_string())
            .send()
            .await?;

        #[derive(serde::Deserialize)]
        #[serde(rename_all = "PascalCase")]
        struct InitiateAuthResponse {
            authentication_result: Option<AuthenticationResult>,
        }
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "PascalCase")]
        struct AuthenticationResult {
            id_token: Option<String>,
        }

        let payload: InitiateAuthResponse = self.handle_response(resp).await?;
        payload
            .authentication_result
            .and_then(|r| r.id_token)
            .map(|t| SecretString::new(t.into()))
            .ok_or_else(|| OtfError::Auth("no IdToken in authentication response".into()))
    }

    async fn get_in_studio_workouts(
        &self,
        token: &SecretString,
    ) -> Result<WorkoutsPayload, OtfError> {
        let url = format!("{}/virtual-class/in-studio-workouts", self.api_base_url);
        tracing::debug!("fetching in-studio workout history");
        let resp = self.get_request(&url, token).send().await?;
        self.handle_response(resp).await
    }

    async fn get_member_summary(
        &self,
        token: &SecretString,
        member_uuid: &str,
    ) -> Result<RawMember, OtfError> {
        let url = format!("{}/member/members/{}", self.api_base_url, member_uuid);
        tracing::debug!(member_uuid, "fetching member summary");
        let resp = self
            .get_request(&url, token)
            .query(&[("include", "memberClassSummary")])
            .send()
            .await?;

        #[derive(serde::Deserialize)]
        struct MemberPayload {
            data: Option<RawMember>,
        }

        let payload: MemberPayload = self.handle_response(resp).await?;
        payload
            .data
            .ok_or_else(|| OtfError::MissingField("member payload has no data object".into()))
    }
}
