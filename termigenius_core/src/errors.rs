use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("given safety level not found: {level}")]
    InvalidSafetyLevel { level: String },

    #[error("failed to parse embedded checks YAML: {source}")]
    PatternLoad {
        #[from]
        source: serde_yaml::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
