use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no input on stdin")]
    EmptyInput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML input: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Engine(#[from] fpv_sim::EngineError),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
