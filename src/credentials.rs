use thiserror::Error;

pub const GITHUB_TOKEN_VAR: &str = "GITHUB_ACCESS_TOKEN";
pub const CHAT_API_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
}

/// Supplies the secrets the outbound clients authenticate with.
pub trait Credentials: Send + Sync {
    fn github_token(&self) -> Result<String, CredentialError>;
    fn chat_api_key(&self) -> Result<String, CredentialError>;
}

/// Reads credentials from the process environment.
pub struct EnvCredentials;

impl EnvCredentials {
    fn read(var: &'static str) -> Result<String, CredentialError> {
        std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(CredentialError::Missing(var))
    }
}

impl Credentials for EnvCredentials {
    fn github_token(&self) -> Result<String, CredentialError> {
        Self::read(GITHUB_TOKEN_VAR)
    }

    fn chat_api_key(&self) -> Result<String, CredentialError> {
        Self::read(CHAT_API_KEY_VAR)
    }
}

/// Fixed credentials for tests.
#[cfg(test)]
#[derive(Clone)]
pub struct StaticCredentials {
    pub github_token: String,
    pub chat_api_key: String,
}

#[cfg(test)]
impl Credentials for StaticCredentials {
    fn github_token(&self) -> Result<String, CredentialError> {
        Ok(self.github_token.clone())
    }

    fn chat_api_key(&self) -> Result<String, CredentialError> {
        Ok(self.chat_api_key.clone())
    }
}
