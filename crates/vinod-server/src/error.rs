use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("No API key configured; set VINOD_PROVIDER__API_KEY or GEMINI_API_KEY")]
    MissingApiKey,

    #[error("Invalid value for {env_var}: {message}")]
    InvalidValue { env_var: String, message: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a dotted config path to the environment variable that sets it,
/// e.g. `provider.api_key` becomes `VINOD_PROVIDER__API_KEY`.
pub fn to_env_var(field_path: &str) -> String {
    let mut env_var = String::from("VINOD_");
    env_var.push_str(&field_path.replace('.', "__").to_uppercase());
    env_var
}
