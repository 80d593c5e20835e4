use crate::error::{to_env_var, ConfigError, API_KEY_ENV};
use aidevops::context::{ContextGatherer, ReadPolicy};
use aidevops::prompt::{system_prompt, Persona};
use aidevops::providers::configs::{OpenAiProviderConfig, ProviderConfig};
use config::{Config, Environment};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_openai_host")]
    pub host: String,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

impl ProviderSettings {
    pub fn into_config(self) -> ProviderConfig {
        ProviderConfig::OpenAi(OpenAiProviderConfig {
            host: self.host,
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ContextSettings {
    #[serde(default = "default_folders")]
    pub folders: Vec<PathBuf>,
    #[serde(default)]
    pub on_unreadable: ReadPolicy,
    #[serde(default)]
    pub max_bytes: Option<usize>,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            folders: default_folders(),
            on_unreadable: ReadPolicy::default(),
            max_bytes: None,
        }
    }
}

impl ContextSettings {
    pub fn into_gatherer(self) -> ContextGatherer {
        ContextGatherer::new(self.folders)
            .with_read_policy(self.on_unreadable)
            .with_max_bytes(self.max_bytes)
    }
}

#[derive(Debug, Deserialize)]
pub struct AssistantSettings {
    #[serde(default = "default_assistant_name")]
    pub name: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    /// A tera template replacing the built-in system prompt
    #[serde(default)]
    pub system_prompt_file: Option<PathBuf>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            platform: default_platform(),
            system_prompt_file: None,
        }
    }
}

impl AssistantSettings {
    pub fn system_prompt(&self) -> anyhow::Result<String> {
        let persona = Persona {
            assistant_name: self.name.clone(),
            platform: self.platform.clone(),
        };
        Ok(system_prompt(&persona, self.system_prompt_file.as_deref())?)
    }
}

#[derive(Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub context: ContextSettings,
    #[serde(default)]
    pub assistant: AssistantSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults
            .set_default("provider.host", default_openai_host())?
            .set_default("provider.model", default_model())?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("AIDEVOPS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("context.folders"),
            )
            // The credential keeps the provider's conventional name
            .set_override_option(
                "provider.api_key",
                std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty()),
            )?
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Handle missing field errors specially
        match result {
            Ok(settings) if settings.provider.api_key.is_empty() => {
                Err(ConfigError::MissingEnvVar {
                    env_var: API_KEY_ENV.to_string(),
                })
            }
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                // "missing field `api_key`", possibly followed by the key it was missing from
                let error_str = err.to_string();
                if let Some(field) = error_str
                    .strip_prefix("missing field `")
                    .and_then(|rest| rest.split('`').next())
                {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else if let config::ConfigError::NotFound(field) = &err {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_host() -> String {
    "https://api.openai.com".to_string()
}

fn default_folders() -> Vec<PathBuf> {
    vec![PathBuf::from("./samples"), PathBuf::from("./dist")]
}

fn default_assistant_name() -> String {
    Persona::default().assistant_name
}

fn default_platform() -> String {
    Persona::default().platform
}
