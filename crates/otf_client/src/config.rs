use crate::OtfError;
use secrecy::SecretString;

pub const DEFAULT_AUTH_URL: &str = "https://cognito-idp.us-east-1.amazonaws.com/";
pub const DEFAULT_API_BASE_URL: &str = "https://api.orangetheory.co";

#[derive(Clone, Debug)]
pub struct Config {
    pub email: String,
    pub password: SecretString,
    pub auth_url: String,
    pub api_base_url: String,
}

impl Config {
    /// Build a config from credentials, keeping the provider's default
    /// endpoints. Used by the interactive prompt path.
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
            auth_url: DEFAULT_AUTH_URL.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
        }
    }

    pub fn from_env() -> Result<Self, OtfError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, OtfError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let email = get("OTF_EMAIL").ok_or_else(|| OtfError::Config("OTF_EMAIL missing".into()))?;
        let password =
            get("OTF_PASSWORD").ok_or_else(|| OtfError::Config("OTF_PASSWORD missing".into()))?;
        let auth_url = get("OTF_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.into());
        let api_base_url = get("OTF_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        Ok(Self {
            email,
            password: SecretString::new(password.into()),
            auth_url,
            api_base_url,
        })
    }
}
