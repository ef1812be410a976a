use crate::config::config::Config;

/// Supplies the bearer credential for backend calls. `None` means the user
/// is not signed in and no request may be made.
pub trait AuthProvider {
    async fn bearer_token(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticToken {
    token: Option<String>,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        StaticToken { token: (!token.trim().is_empty()).then_some(token) }
    }

    pub fn none() -> Self {
        StaticToken { token: None }
    }

    pub fn from_config(config: &Config) -> Self {
        match config.api_token.as_deref() {
            Some(token) => StaticToken::new(token),
            None => StaticToken::none(),
        }
    }
}

impl AuthProvider for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}
