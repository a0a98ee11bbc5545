//! Firebase Identity Toolkit REST provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{AuthSession, IdentityProvider};
use crate::error::AuthError;
use crate::storage::AuthConfig;

#[derive(Debug, Clone)]
pub struct FirebaseAuth {
    http: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct OobResponse {}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl FirebaseAuth {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &AuthConfig, api_key: Option<String>) -> Result<Self, AuthError> {
        let key = api_key.ok_or_else(|| {
            AuthError::NotConfigured("set auth.api_key or MINDWELL_FIREBASE_API_KEY".into())
        })?;
        Ok(Self::new(&config.endpoint, key))
    }

    fn url(&self, method: &str) -> Result<Url, AuthError> {
        let base = self.endpoint.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/accounts:{method}"))
            .map_err(|e| AuthError::NotConfigured(format!("invalid endpoint: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn call<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<R, AuthError> {
        let response = self.http.post(self.url(method)?).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let code = serde_json::from_str::<ErrorWrapper>(&text)
                .map(|w| w.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            tracing::debug!(method, %code, "identity request rejected");
            return Err(map_error_code(&code));
        }
        serde_json::from_str(&text).map_err(|e| AuthError::Provider(e.to_string()))
    }

    async fn password_call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account: AccountResponse = self.call(method, &body).await?;
        Ok(AuthSession {
            user_id: account.local_id,
            email: account.email.unwrap_or_else(|| email.to_string()),
            id_token: account.id_token,
        })
    }
}

/// Map an Identity Toolkit error code (e.g. `WEAK_PASSWORD : Password
/// should be at least 6 characters`) to an [`AuthError`].
fn map_error_code(code: &str) -> AuthError {
    let (head, detail) = match code.split_once(':') {
        Some((head, detail)) => (head.trim(), detail.trim()),
        None => (code.trim(), ""),
    };
    match head {
        "EMAIL_EXISTS" => AuthError::EmailExists,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" => {
            AuthError::InvalidCredentials
        }
        "WEAK_PASSWORD" => AuthError::WeakPassword(if detail.is_empty() {
            "password rejected".to_string()
        } else {
            detail.to_string()
        }),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::RateLimited,
        _ => AuthError::Provider(code.to_string()),
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn create_account(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let body = OobRequest {
            request_type: "PASSWORD_RESET",
            email,
        };
        let _: OobResponse = self.call("sendOobCode", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn error_codes_map_to_variants() {
        assert!(matches!(map_error_code("EMAIL_EXISTS"), AuthError::EmailExists));
        assert!(matches!(
            map_error_code("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            map_error_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword(ref m) if m == "Password should be at least 6 characters"
        ));
        assert!(matches!(
            map_error_code("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthError::RateLimited
        ));
        assert!(matches!(map_error_code("USER_DISABLED"), AuthError::Provider(_)));
    }

    #[tokio::test]
    async fn sign_up_returns_local_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(r"^/accounts:signUp".into()))
            .match_query(Matcher::UrlEncoded("key".into(), "api".into()))
            .match_body(Matcher::PartialJson(json!({
                "email": "a@b.co",
                "password": "hunter22",
                "returnSecureToken": true
            })))
            .with_status(200)
            .with_body(r#"{"localId":"uid-1","email":"a@b.co","idToken":"tok"}"#)
            .create_async()
            .await;

        let auth = FirebaseAuth::new(server.url(), "api");
        let session = auth.create_account("a@b.co", "hunter22").await.unwrap();
        assert_eq!(session.user_id, "uid-1");
        assert_eq!(session.id_token.as_deref(), Some("tok"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_sign_in_is_invalid_credentials() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Regex(r"^/accounts:signInWithPassword".into()))
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"INVALID_LOGIN_CREDENTIALS"}}"#)
            .create_async()
            .await;

        let auth = FirebaseAuth::new(server.url(), "api");
        let err = auth.sign_in("a@b.co", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn password_reset_sends_oob_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Regex(r"^/accounts:sendOobCode".into()))
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "requestType": "PASSWORD_RESET",
                "email": "a@b.co"
            })))
            .with_status(200)
            .with_body(r#"{"email":"a@b.co"}"#)
            .create_async()
            .await;

        let auth = FirebaseAuth::new(server.url(), "api");
        auth.send_password_reset("a@b.co").await.unwrap();
        mock.assert_async().await;
    }
}
