//! Viewer and exporter configuration.
//!
//! Loaded from a TOML file. Every section and key is optional; missing
//! values fall back to the defaults below (a dark theme at 1024x768).

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::render::highlight::DEFAULT_SYNTAX_THEME;
use crate::render::types::{parse_color, RenderDimensions, Theme};

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "deck.toml";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub window: WindowConfig,
    pub theme: ThemeConfig,
    pub text: TextConfig,
    pub assets: AssetConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

/// Colors by name ("white") or hex ("#42affa")
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub background: String,
    pub foreground: String,
    pub heading: String,
    pub accent: String,
    pub code_background: String,
    pub code_foreground: String,
    /// Bundled syntect theme for code, e.g. "base16-ocean.dark"
    pub syntax: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Paragraph size in pixels at the configured window size
    pub base_font_size: f32,
    /// Code size as a multiple of the base size
    pub code_scale: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    /// Directory image references are resolved against
    pub dir: PathBuf,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Using Rust for Android Development".to_string(),
            width: 1024,
            height: 768,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: "#191919".to_string(),
            foreground: "white".to_string(),
            heading: "white".to_string(),
            accent: "#42affa".to_string(),
            code_background: "#3f3f3f".to_string(),
            code_foreground: "#dcdccc".to_string(),
            syntax: DEFAULT_SYNTAX_THEME.to_string(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            base_font_size: 32.0,
            code_scale: 0.55,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::Config {
            source,
            path: path.to_path_buf(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        let config = Self::from_toml(&text, path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `explicit` if given, else `deck.toml` in the working directory
    /// if present, else the defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            Self::load(fallback)
        } else {
            debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
            Ok(Self::default())
        }
    }

    /// Asset directory made absolute against the working directory, so the
    /// existence check and the viewer's asset server see the same files
    pub fn asset_dir(&self) -> Result<PathBuf> {
        std::path::absolute(&self.assets.dir).map_err(|e| Error::io(e, &self.assets.dir))
    }

    pub fn dimensions(&self) -> RenderDimensions {
        RenderDimensions {
            width: self.window.width as f32,
            height: self.window.height as f32,
        }
    }

    pub fn theme(&self) -> Result<Theme> {
        let color = |value: &str| {
            parse_color(value).ok_or_else(|| Error::InvalidColor(value.to_string()))
        };
        let theme = &self.theme;
        Ok(Theme {
            background: color(&theme.background)?,
            foreground: color(&theme.foreground)?,
            heading: color(&theme.heading)?,
            accent: color(&theme.accent)?,
            code_background: color(&theme.code_background)?,
            code_foreground: color(&theme.code_foreground)?,
            syntax: theme.syntax.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::types::RenderColor;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::from_toml("", Path::new("deck.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.dimensions(), RenderDimensions::default());
        assert_eq!(config.theme().unwrap().foreground, RenderColor::white());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            "[window]\nwidth = 1920\nheight = 1080\n\n[theme]\nbackground = \"black\"\n",
            Path::new("deck.toml"),
        )
        .unwrap();
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.window.title, WindowConfig::default().title);
        assert_eq!(config.theme().unwrap().background, RenderColor::black());
        assert_eq!(config.text, TextConfig::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = Config::from_toml("[window]\ncolour = 1\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_bad_color() {
        let config = Config::from_toml("[theme]\naccent = \"mauve-ish\"\n", Path::new("x.toml")).unwrap();
        assert!(matches!(config.theme(), Err(Error::InvalidColor(c)) if c == "mauve-ish"));
    }

    #[test]
    fn test_asset_dir_is_absolute() {
        let config = Config::default();
        let dir = config.asset_dir().unwrap();
        assert!(dir.is_absolute());
        assert_eq!(dir, std::env::current_dir().unwrap().join("assets"));

        let config = Config::from_toml("[assets]\ndir = \"/srv/slides\"\n", Path::new("x.toml")).unwrap();
        assert_eq!(config.asset_dir().unwrap(), PathBuf::from("/srv/slides"));
    }

    #[test]
    fn test_syntax_theme_setting() {
        let config = Config::from_toml("[theme]\nsyntax = \"base16-ocean.dark\"\n", Path::new("x.toml")).unwrap();
        assert_eq!(config.theme().unwrap().syntax, "base16-ocean.dark");
        assert_eq!(Config::default().theme().unwrap().syntax, DEFAULT_SYNTAX_THEME);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::discover(Some(Path::new("/nonexistent/deck.toml"))).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
