//! Site configuration.
//!
//! Only `sitename` and `logo` change what the Open Graph tags contain. The
//! remaining settings are what the host needs to turn titles and paths into
//! absolute URLs, and use the same names as the corresponding MediaWiki
//! `$wg` globals.

use super::Result;
use serde::Deserialize;
use std::path::Path;

/// Process-wide, read-only site configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// The display name of the site (`$wgSitename`).
    pub sitename: String,
    /// The path or URL of the site logo (`$wgLogo`), used as the fallback
    /// Open Graph image.
    pub logo: String,
    /// The base URL of the server (`$wgServer`). This may be
    /// protocol-relative.
    pub server: String,
    /// The URL path to articles (`$wgArticlePath`). `$1` is replaced by the
    /// URL-encoded page title.
    pub article_path: String,
    /// The URL path to uploaded files (`$wgUploadPath`).
    pub upload_path: String,
    /// The title of the main page.
    pub main_page: String,
    /// The content language code (`$wgLanguageCode`).
    pub language_code: String,
}

/// The server used when none is configured.
pub const DEFAULT_SERVER: &str = "http://localhost";

impl Default for Config {
    fn default() -> Self {
        Self {
            sitename: "MediaWiki".into(),
            logo: "/resources/assets/wiki.png".into(),
            server: DEFAULT_SERVER.into(),
            article_path: "/wiki/$1".into(),
            upload_path: "/images".into(),
            main_page: "Main Page".into(),
            language_code: "en".into(),
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file. Missing keys keep their default
    /// values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Loads configuration from a JSON string. Missing keys keep their
    /// default values.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
