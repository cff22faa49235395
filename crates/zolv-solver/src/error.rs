use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    // Configuration errors
    #[error("Failed to parse resolver configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    // Capability errors
    #[error("Invalid capability: {0}")]
    InvalidCapability(String),

    // Edition errors
    #[error("Invalid edition: {0}")]
    InvalidEdition(#[from] zolv_edition::EditionError),
}

pub type Result<T> = std::result::Result<T, SolverError>;
