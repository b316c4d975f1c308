pub mod config;
pub mod error;
pub mod types;

pub use config::GistbotConfig;
pub use error::{GistbotError, Result};
pub use types::Gist;
