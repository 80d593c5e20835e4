use aidevops::context::ContextGatherer;
use aidevops::providers::configs::ProviderConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub provider_config: ProviderConfig,
    pub gatherer: ContextGatherer,
    /// Rendered once at start-up
    pub system_prompt: String,
}
