use thiserror::Error;

/// The credential is read from the provider's conventional variable rather than the AIDEVOPS_ prefix
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a configuration key, e.g. `provider.model`, to the environment variable that sets it
pub fn to_env_var(field_path: &str) -> String {
    let leaf = field_path.rsplit('.').next().unwrap_or(field_path);
    if leaf == "api_key" {
        return API_KEY_ENV.to_string();
    }

    let parts: Vec<String> = field_path.split('.').map(|part| part.to_uppercase()).collect();
    format!("AIDEVOPS_{}", parts.join("__"))
}
