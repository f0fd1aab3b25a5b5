use app_api::AppContext;

#[derive(Clone)]
pub struct HttpState {
    pub context: AppContext,
    /// When set, `/update_stats` requires `Authorization: Bearer <token>`.
    pub api_token: Option<String>,
    pub allowed_origins: Vec<String>,
}

impl HttpState {
    pub fn new(context: AppContext) -> Self {
        Self {
            context,
            api_token: None,
            allowed_origins: Vec::new(),
        }
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }
}
