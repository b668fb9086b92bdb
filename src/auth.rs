//! Azure AD access tokens for the SQL endpoint.
//!
//! Managed identity tokens come from the App Service identity endpoint when
//! the Functions host provides one (`IDENTITY_ENDPOINT` / `IDENTITY_HEADER`),
//! and from the instance metadata service otherwise. Service principal tokens
//! use the client credentials flow. Tokens are fetched per connection.

use serde::Deserialize;
use url::Url;

use crate::config::AuthConfig;
use crate::error::{ProxyError, Result};

/// Resource the SQL endpoint accepts tokens for.
pub const SQL_RESOURCE: &str = "https://database.windows.net/";

const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";
const AUTHORITY: &str = "https://login.microsoftonline.com";

/// Credentials to present when logging in to the SQL endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Azure AD access token.
    AccessToken(String),
    /// SQL login.
    SqlLogin { user: String, password: String },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Where the managed identity token is requested from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEndpoint {
    /// App Service / Functions identity endpoint with its secret header.
    AppService { endpoint: String, header: String },
    /// Azure instance metadata service.
    Imds,
}

impl IdentityEndpoint {
    /// Picks the endpoint from the environment the host provides.
    pub fn from_env() -> Self {
        match (
            std::env::var("IDENTITY_ENDPOINT"),
            std::env::var("IDENTITY_HEADER"),
        ) {
            (Ok(endpoint), Ok(header)) if !endpoint.is_empty() => {
                Self::AppService { endpoint, header }
            }
            _ => Self::Imds,
        }
    }

    /// Builds the token request URL.
    pub fn token_url(&self, client_id: Option<&str>) -> Result<Url> {
        let (base, api_version) = match self {
            Self::AppService { endpoint, .. } => (endpoint.as_str(), APP_SERVICE_API_VERSION),
            Self::Imds => (IMDS_ENDPOINT, IMDS_API_VERSION),
        };

        let mut url = Url::parse(base)
            .map_err(|e| ProxyError::auth(format!("Invalid identity endpoint '{base}': {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-version", api_version);
            query.append_pair("resource", SQL_RESOURCE);
            if let Some(id) = client_id {
                query.append_pair("client_id", id);
            }
        }
        Ok(url)
    }

    fn header(&self) -> (&'static str, String) {
        match self {
            Self::AppService { header, .. } => ("X-IDENTITY-HEADER", header.clone()),
            Self::Imds => ("Metadata", "true".to_string()),
        }
    }
}

/// Acquires login credentials according to the configured method.
pub async fn acquire(http: &reqwest::Client, auth: &AuthConfig) -> Result<Credentials> {
    match auth {
        AuthConfig::ManagedIdentity { client_id } => {
            let token = managed_identity_token(
                http,
                &IdentityEndpoint::from_env(),
                client_id.as_deref(),
            )
            .await?;
            Ok(Credentials::AccessToken(token))
        }
        AuthConfig::ServicePrincipal {
            tenant_id: Some(tenant_id),
            client_id: Some(client_id),
            client_secret: Some(client_secret),
        } => {
            let token = service_principal_token(http, tenant_id, client_id, client_secret).await?;
            Ok(Credentials::AccessToken(token))
        }
        AuthConfig::SqlLogin {
            user: Some(user),
            password: Some(password),
        } => Ok(Credentials::SqlLogin {
            user: user.clone(),
            password: password.clone(),
        }),
        incomplete => {
            incomplete.validate()?;
            Err(ProxyError::config(format!(
                "sql.auth method '{}' is incomplete",
                incomplete.method_name()
            )))
        }
    }
}

/// Requests a token for the SQL resource from a managed identity endpoint.
pub async fn managed_identity_token(
    http: &reqwest::Client,
    endpoint: &IdentityEndpoint,
    client_id: Option<&str>,
) -> Result<String> {
    let url = endpoint.token_url(client_id)?;
    let (name, value) = endpoint.header();

    let response = http
        .get(url)
        .header(name, value)
        .send()
        .await
        .map_err(|e| ProxyError::auth(format!("Managed identity request failed: {e}")))?;

    read_token(response).await
}

/// Requests a token for the SQL resource with the client credentials flow.
pub async fn service_principal_token(
    http: &reqwest::Client,
    tenant_id: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String> {
    let url = format!("{AUTHORITY}/{tenant_id}/oauth2/v2.0/token");
    let scope = format!("{SQL_RESOURCE}.default");
    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("scope", scope.as_str()),
    ];

    let response = http
        .post(url)
        .form(&form)
        .send()
        .await
        .map_err(|e| ProxyError::auth(format!("Token request failed: {e}")))?;

    read_token(response).await
}

async fn read_token(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProxyError::auth(format!(
            "Token endpoint returned {status}: {body}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| ProxyError::auth(format!("Malformed token response: {e}")))?;
    Ok(token.access_token)
}
