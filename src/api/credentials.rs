use crate::generation::errors::GenerationError;
use std::env;
use std::fmt;

/// Environment variables checked by [`EnvCredentials`], in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// An API key handed to the model client. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Credential(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Source of the API key, passed to the request builder at call time.
pub trait CredentialProvider: Send + Sync {
    fn is_available(&self) -> bool;
    fn acquire(&self) -> Result<Credential, GenerationError>;
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Key stored in `config.toml`.
pub struct StaticCredentials {
    api_key: Option<String>,
}

impl StaticCredentials {
    pub fn new(api_key: Option<String>) -> Self {
        StaticCredentials {
            api_key: non_blank(api_key.as_deref()),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn acquire(&self) -> Result<Credential, GenerationError> {
        self.api_key
            .clone()
            .map(Credential::new)
            .ok_or(GenerationError::MissingCredential)
    }
}

/// Key read from the process environment on every call.
pub struct EnvCredentials;

impl EnvCredentials {
    fn lookup() -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .find_map(|name| non_blank(env::var(name).ok().as_deref()))
    }
}

impl CredentialProvider for EnvCredentials {
    fn is_available(&self) -> bool {
        Self::lookup().is_some()
    }

    fn acquire(&self) -> Result<Credential, GenerationError> {
        Self::lookup()
            .map(Credential::new)
            .ok_or(GenerationError::MissingCredential)
    }
}

/// Tries each provider in order and uses the first one that has a key.
pub struct ChainedCredentials {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainedCredentials {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        ChainedCredentials { providers }
    }
}

impl CredentialProvider for ChainedCredentials {
    fn is_available(&self) -> bool {
        self.providers.iter().any(|provider| provider.is_available())
    }

    fn acquire(&self) -> Result<Credential, GenerationError> {
        self.providers
            .iter()
            .find(|provider| provider.is_available())
            .ok_or(GenerationError::MissingCredential)?
            .acquire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_static_key_is_unavailable() {
        let provider = StaticCredentials::new(Some("   ".to_string()));
        assert!(!provider.is_available());
        assert!(matches!(
            provider.acquire(),
            Err(GenerationError::MissingCredential)
        ));
    }

    #[test]
    fn static_key_is_trimmed() {
        let provider = StaticCredentials::new(Some(" abc \n".to_string()));
        assert_eq!(provider.acquire().unwrap().expose(), "abc");
    }

    #[test]
    fn chain_uses_first_available_provider() {
        let chain = ChainedCredentials::new(vec![
            Box::new(StaticCredentials::new(None)),
            Box::new(StaticCredentials::new(Some("second".to_string()))),
            Box::new(StaticCredentials::new(Some("third".to_string()))),
        ]);
        assert!(chain.is_available());
        assert_eq!(chain.acquire().unwrap().expose(), "second");
    }

    #[test]
    fn empty_chain_reports_missing_credential() {
        let chain = ChainedCredentials::new(Vec::new());
        assert!(!chain.is_available());
        assert!(matches!(
            chain.acquire(),
            Err(GenerationError::MissingCredential)
        ));
    }

    #[test]
    fn debug_output_hides_key() {
        let credential = Credential::new("secret");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
    }
}
