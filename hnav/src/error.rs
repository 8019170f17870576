use hnav_router::{ChromeError, ConfigError};
use hnav_utils::Lang;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("header settings are invalid: {0}")]
    Settings(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Chrome(#[from] ChromeError),
    #[error("language `{0}` is not enabled on this site")]
    UnsupportedLanguage(Lang),
    #[error("browser API unavailable: {0}")]
    Browser(String),
}
