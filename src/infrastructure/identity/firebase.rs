use super::{AuthError, AuthResult, AuthSession, IdentityProvider};
use crate::domain::User;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com";

#[derive(Debug, Clone, PartialEq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_url: String,
    pub token_url: String,
    pub timeout: Duration,
}

impl FirebaseConfig {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_key: api_key.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout,
        }
    }

    /// Points both endpoints at a local auth emulator, e.g. `localhost:9099`.
    pub fn with_emulator(mut self, host: &str) -> Self {
        self.auth_url = format!("http://{}/identitytoolkit.googleapis.com", host);
        self.token_url = format!("http://{}/securetoken.googleapis.com", host);
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl AccountResponse {
    fn user(&self) -> User {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        User {
            uid: self.local_id.clone(),
            display_name: non_empty(&self.display_name),
            email: non_empty(&self.email),
            photo_url: non_empty(&self.photo_url),
        }
    }

    fn into_session(self) -> AuthSession {
        AuthSession {
            user: self.user(),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountResponse>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps an identity toolkit error message such as
/// `WEAK_PASSWORD : Password should be at least 6 characters` to an error.
pub fn map_error_code(message: &str) -> AuthError {
    let code = message.split(" : ").next().unwrap_or(message).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            AuthError::Rejected("Invalid email or password".to_string())
        }
        "EMAIL_EXISTS" => AuthError::Rejected("Email address is already in use".to_string()),
        "USER_DISABLED" => AuthError::Rejected("This account has been disabled".to_string()),
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "INVALID_REFRESH_TOKEN" => {
            AuthError::Rejected("Session expired, please sign in again".to_string())
        }
        "WEAK_PASSWORD" => AuthError::Validation("Password should be at least 6 characters".to_string()),
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::Validation("Invalid email address".to_string()),
        "MISSING_PASSWORD" => AuthError::Validation("Password is required".to_string()),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::Unavailable("Too many attempts, try again later".to_string()),
        other if other.starts_with("API key not valid") || other == "INVALID_API_KEY" => {
            AuthError::Unavailable("identity service rejected the API key".to_string())
        }
        other => AuthError::Rejected(other.to_string()),
    }
}

/// Identity provider backed by the Firebase Identity Toolkit REST API.
pub struct FirebaseIdentity {
    client: Client,
    config: FirebaseConfig,
}

impl FirebaseIdentity {
    pub fn new(config: FirebaseConfig) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::Unavailable(e.without_url().to_string()))?;
        Ok(Self { client, config })
    }

    fn accounts_url(&self, method: &str) -> String {
        format!("{}/v1/accounts:{}?key={}", self.config.auth_url, method, self.config.api_key)
    }

    fn post<T: DeserializeOwned>(&self, url: &str, body: &serde_json::Value) -> AuthResult<T> {
        let response = self.client.post(url).json(body).send().map_err(|e| {
            let e = e.without_url();
            tracing::warn!(error = %e, "identity service request failed");
            AuthError::Unavailable(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .map_err(|e| AuthError::Unavailable(format!("unexpected response: {}", e.without_url())));
        }
        if status.is_server_error() {
            return Err(AuthError::Unavailable(format!("service returned {}", status)));
        }
        let message = response
            .json::<ErrorEnvelope>()
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| status.to_string());
        tracing::debug!(%status, code = %message, "identity service refused request");
        Err(map_error_code(&message))
    }

    fn lookup(&self, id_token: &str) -> AuthResult<User> {
        let response: LookupResponse = self.post(&self.accounts_url("lookup"), &json!({ "idToken": id_token }))?;
        response
            .users
            .first()
            .map(AccountResponse::user)
            .ok_or_else(|| map_error_code("USER_NOT_FOUND"))
    }

    fn refresh(&self, refresh_token: &str) -> AuthResult<TokenResponse> {
        let url = format!("{}/v1/token?key={}", self.config.token_url, self.config.api_key);
        self.post(&url, &json!({ "grant_type": "refresh_token", "refresh_token": refresh_token }))
    }

    fn password_request(&self, method: &str, email: &str, password: &str) -> AuthResult<AuthSession> {
        let response: AccountResponse = self.post(
            &self.accounts_url(method),
            &json!({ "email": email, "password": password, "returnSecureToken": true }),
        )?;
        Ok(response.into_session())
    }
}

impl IdentityProvider for FirebaseIdentity {
    fn name(&self) -> &'static str {
        "firebase"
    }

    fn restore(&self, saved: Option<&AuthSession>) -> AuthResult<Option<AuthSession>> {
        let Some(saved) = saved else {
            return Ok(None);
        };
        let Some(id_token) = saved.id_token.as_deref() else {
            return Ok(None);
        };

        match self.lookup(id_token) {
            Ok(user) => Ok(Some(AuthSession { user, ..saved.clone() })),
            Err(AuthError::Rejected(_)) => {
                let Some(refresh_token) = saved.refresh_token.as_deref() else {
                    return Ok(None);
                };
                match self.refresh(refresh_token) {
                    Ok(tokens) => {
                        let user = self.lookup(&tokens.id_token)?;
                        Ok(Some(AuthSession {
                            user,
                            id_token: Some(tokens.id_token),
                            refresh_token: Some(tokens.refresh_token),
                        }))
                    }
                    Err(AuthError::Rejected(_)) => Ok(None),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        self.password_request("signInWithPassword", email, password)
    }

    fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        self.password_request("signUp", email, password)
    }

    fn sign_out(&self, _session: Option<&AuthSession>) -> AuthResult<()> {
        // Tokens are bearer tokens; dropping them locally is the sign-out.
        Ok(())
    }

    fn sign_in_with_federated(&self) -> AuthResult<AuthSession> {
        Err(AuthError::Unsupported("Federated sign-in"))
    }

    fn send_password_reset(&self, email: &str) -> AuthResult<()> {
        let _: serde_json::Value = self.post(
            &self.accounts_url("sendOobCode"),
            &json!({ "requestType": "PASSWORD_RESET", "email": email }),
        )?;
        Ok(())
    }
}
