//! Server configuration parsed from environment variables.
//!
//! | Variable            | Default   | Meaning                                  |
//! |---------------------|-----------|------------------------------------------|
//! | `PORT`              | `3000`    | HTTP listen port                         |
//! | `DATA_DIR`          | `./data`  | Directory holding the history store      |
//! | `WEB_DIR`           | `./web`   | Static page files served at `/`          |
//! | `IMAGE_MAX_EDGE_PX` | `1536`    | Longest photo edge sent to the provider  |
//! | `THUMBNAIL_EDGE_PX` | `256`     | Longest edge of history thumbnails       |
//!
//! LLM settings live in [`crate::llm::config`]. Unparseable values fall back
//! to their defaults.

use std::path::PathBuf;

use crate::llm::config::parse_or;
use crate::services::image::{DEFAULT_MAX_EDGE_PX, DEFAULT_THUMBNAIL_EDGE_PX, ImageConfig};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_WEB_DIR: &str = "./web";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub web_dir: PathBuf,
    pub image: ImageConfig,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads values through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let dir = |key: &str, default: &str| {
            PathBuf::from(lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string()))
        };
        let image = ImageConfig {
            max_edge_px: parse_or(&lookup, "IMAGE_MAX_EDGE_PX", DEFAULT_MAX_EDGE_PX).max(1),
            thumbnail_edge_px: parse_or(&lookup, "THUMBNAIL_EDGE_PX", DEFAULT_THUMBNAIL_EDGE_PX).max(1),
        };
        Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            data_dir: dir("DATA_DIR", DEFAULT_DATA_DIR),
            web_dir: dir("WEB_DIR", DEFAULT_WEB_DIR),
            image,
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
