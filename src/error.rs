use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} environment variable is required, set it in .env!")]
    MissingSecret { var: &'static str },
}
