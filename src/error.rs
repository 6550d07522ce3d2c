/// Errors of the outer layer (config loading, terminal I/O). The simulation
/// itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
