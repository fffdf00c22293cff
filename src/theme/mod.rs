//! Color themes, preview styles, and the persisted theme preference.
//!
//! The active [`Theme`] drives the terminal palette and the syntect theme of
//! the code view. The active [`PreviewStyle`] selects the CSS rules held in the
//! single [`StyleSlot`] and the class on the preview wrapper.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Preferences key holding the theme name.
pub const THEME_KEY: &str = "theme";

/// Editor color theme.
#[derive(
    clap::ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Vibrant,
}

impl Theme {
    pub const ALL: [Self; 3] = [Self::Light, Self::Dark, Self::Vibrant];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Vibrant => "vibrant",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|theme| theme.name() == name.trim())
    }

    /// The theme after this one, wrapping around.
    pub const fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Vibrant,
            Self::Vibrant => Self::Light,
        }
    }

    pub const fn is_light(self) -> bool {
        matches!(self, Self::Light)
    }

    /// Editor color scheme name: `material-darker` for dark, `default` otherwise.
    pub const fn editor_scheme(self) -> &'static str {
        match self {
            Self::Dark => "material-darker",
            Self::Light | Self::Vibrant => "default",
        }
    }
}

/// Named CSS ruleset applied to the preview container.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PreviewStyle {
    #[default]
    Default,
    Article,
    Technical,
    Elegant,
}

impl PreviewStyle {
    pub const ALL: [Self; 4] = [Self::Default, Self::Article, Self::Technical, Self::Elegant];

    /// Class name used on the preview wrapper.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Article => "article",
            Self::Technical => "technical",
            Self::Elegant => "elegant",
        }
    }

    /// Parse a style name; unknown names fall back to `default`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|style| style.name() == name.trim())
            .unwrap_or_default()
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Default => Self::Article,
            Self::Article => Self::Technical,
            Self::Technical => Self::Elegant,
            Self::Elegant => Self::Default,
        }
    }

    /// The style's CSS rule block. `default` has none.
    pub const fn css(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Article => ARTICLE_CSS,
            Self::Technical => TECHNICAL_CSS,
            Self::Elegant => ELEGANT_CSS,
        }
    }
}

const ARTICLE_CSS: &str = "
    .md-preview-style.article {
      background: #fff8f2;
      padding: 2.2em 1.4em 2.2em 2.8em;
      border-radius: 8px;
      box-shadow: 0 5px 45px -18px #ffc88f81;
      font-family: 'Inter', serif;
    }
    .md-preview-style.article h1, .md-preview-style.article h2 { color: #ee8541;}
    .md-preview-style.article blockquote { color: #e05188;}
  ";

const TECHNICAL_CSS: &str = "
    .md-preview-style.technical {
      background: #161829;
      color: #c2d7ff;
      padding: 2.2em 1.2em;
      border-radius: 6px;
      box-shadow: 0 1px 14px -4px #124ba3e6;
      font-family: 'JetBrains Mono', 'Fira Mono', monospace;
    }
    .md-preview-style.technical a { color: #5ad6ff;}
    .md-preview-style.technical code { background: #1b232d; color: #fcf6ff;}
  ";

const ELEGANT_CSS: &str = "
    .md-preview-style.elegant {
      background: #faf8f6;
      color: #3c2d28;
      font-family: 'Merriweather', Georgia, serif;
      border-radius: 9px;
      border: 1.1px solid #e0caae;
      padding: 2.8em 2em 2em 3.2em;
      box-shadow: 0 6px 22px -2px #dcb08448;
    }
    .md-preview-style.elegant h1, .md-preview-style.elegant h2 { color: #aa6f37;}
    .md-preview-style.elegant blockquote { color: #b58900;}
  ";

/// The single injected stylesheet. Its content is only ever replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSlot {
    css: String,
}

impl StyleSlot {
    pub fn replace(&mut self, css: &str) {
        css.clone_into(&mut self.css);
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn is_empty(&self) -> bool {
        self.css.is_empty()
    }
}

/// JSON key-value preferences file holding the theme.
///
/// A store without a path reads nothing and writes nothing.
#[derive(Debug, Clone, Default)]
pub struct ThemeStore {
    path: Option<PathBuf>,
}

impl ThemeStore {
    pub const fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub const fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the stored theme. Missing files, malformed JSON, and unknown
    /// names all read as `None`.
    pub fn load(&self) -> Option<Theme> {
        let path = self.path.as_deref()?;
        let prefs = match read_preferences(path) {
            Ok(prefs) => prefs,
            Err(err) => {
                tracing::warn!("ignoring preferences file: {err:#}");
                return None;
            }
        };
        let name = prefs.get(THEME_KEY)?.as_str()?;
        let theme = Theme::from_name(name);
        if theme.is_none() {
            tracing::warn!(name, "unknown stored theme");
        }
        theme
    }

    /// Write the theme, keeping any other keys already in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences file cannot be written.
    pub fn save(&self, theme: Theme) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let mut prefs = read_preferences(path).unwrap_or_default();
        prefs.insert(THEME_KEY.to_string(), Value::String(theme.name().to_string()));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(&Value::Object(prefs))
            .context("Failed to serialize preferences")?;
        fs::write(path, format!("{body}\n"))
            .with_context(|| format!("Failed to write preferences {}", path.display()))
    }
}

fn read_preferences(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read preferences {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(&content)
        .with_context(|| format!("Failed to parse preferences {}", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Preferences {} is not a JSON object", path.display()),
    }
}

/// Active theme, active preview style, and the style slot.
#[derive(Debug, Clone, Default)]
pub struct ThemeManager {
    theme: Theme,
    preview_style: PreviewStyle,
    slot: StyleSlot,
    store: ThemeStore,
}

impl ThemeManager {
    /// Start from the stored theme, or `preset` when given, or `light`.
    ///
    /// The resolved theme is applied, which writes it back to the store.
    pub fn load_theme(store: ThemeStore, preset: Option<Theme>) -> Self {
        let theme = preset.or_else(|| store.load()).unwrap_or_default();
        let mut manager = Self {
            theme,
            preview_style: PreviewStyle::Default,
            slot: StyleSlot::default(),
            store,
        };
        if let Err(err) = manager.apply_theme(theme) {
            tracing::warn!("failed to persist theme: {err:#}");
        }
        manager
    }

    /// Switch theme and persist it immediately.
    ///
    /// The theme is applied even when persisting fails.
    ///
    /// # Errors
    ///
    /// Returns the persistence error.
    pub fn apply_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        crate::perf::log_event("theme.apply", theme.name());
        self.store.save(theme)
    }

    /// Switch preview style and replace the style slot with its rules.
    ///
    /// Callers re-render afterwards so the wrapper class follows.
    pub fn apply_preview_style(&mut self, style: PreviewStyle) {
        self.preview_style = style;
        self.slot.replace(style.css());
        crate::perf::log_event("preview_style.apply", style.name());
    }

    pub const fn theme(&self) -> Theme {
        self.theme
    }

    pub const fn preview_style(&self) -> PreviewStyle {
        self.preview_style
    }

    pub const fn style_slot(&self) -> &StyleSlot {
        &self.slot
    }

    pub const fn store(&self) -> &ThemeStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_theme_names_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_name(theme.name()), Some(theme));
        }
        assert_eq!(Theme::from_name("solarized"), None);
    }

    #[test]
    fn test_theme_cycle_visits_all() {
        let mut theme = Theme::Light;
        for _ in 0..3 {
            theme = theme.next();
        }
        assert_eq!(theme, Theme::Light);
        assert_eq!(Theme::Light.next(), Theme::Dark);
    }

    #[test]
    fn test_editor_scheme_follows_theme() {
        assert_eq!(Theme::Dark.editor_scheme(), "material-darker");
        assert_eq!(Theme::Light.editor_scheme(), "default");
        assert_eq!(Theme::Vibrant.editor_scheme(), "default");
    }

    #[test]
    fn test_preview_style_unknown_falls_back_to_default() {
        assert_eq!(PreviewStyle::from_name("fancy"), PreviewStyle::Default);
        assert_eq!(PreviewStyle::from_name("article"), PreviewStyle::Article);
        assert_eq!(PreviewStyle::Default.css(), "");
    }

    #[test]
    fn test_preview_style_css_targets_its_class() {
        for style in [PreviewStyle::Article, PreviewStyle::Technical, PreviewStyle::Elegant] {
            let selector = format!(".md-preview-style.{}", style.name());
            assert!(style.css().contains(&selector));
        }
    }

    #[test]
    fn test_style_change_replaces_slot() {
        let mut manager = ThemeManager::load_theme(ThemeStore::in_memory(), None);
        manager.apply_preview_style(PreviewStyle::Article);
        assert!(manager.style_slot().css().contains(".article"));

        manager.apply_preview_style(PreviewStyle::Technical);
        assert!(!manager.style_slot().css().contains(".article"));
        assert_eq!(manager.style_slot().css(), PreviewStyle::Technical.css());

        manager.apply_preview_style(PreviewStyle::Technical);
        assert_eq!(manager.style_slot().css(), PreviewStyle::Technical.css());

        manager.apply_preview_style(PreviewStyle::Default);
        assert!(manager.style_slot().is_empty());
    }

    #[test]
    fn test_theme_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let mut manager = ThemeManager::load_theme(ThemeStore::new(path.clone()), None);
        assert_eq!(manager.theme(), Theme::Light);

        manager.apply_theme(Theme::Vibrant).unwrap();
        let reloaded = ThemeManager::load_theme(ThemeStore::new(path), None);
        assert_eq!(reloaded.theme(), Theme::Vibrant);
    }

    #[test]
    fn test_unknown_stored_theme_falls_back_to_light() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"theme": "neon"}"#).unwrap();
        let manager = ThemeManager::load_theme(ThemeStore::new(path), None);
        assert_eq!(manager.theme(), Theme::Light);
    }

    #[test]
    fn test_malformed_preferences_fall_back_to_light() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(ThemeStore::new(path).load(), None);
    }

    #[test]
    fn test_save_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"font": "mono", "theme": "light"}"#).unwrap();
        ThemeStore::new(path.clone()).save(Theme::Dark).unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["font"], "mono");
        assert_eq!(value["theme"], "dark");
    }

    #[test]
    fn test_preset_overrides_stored_theme() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        ThemeStore::new(path.clone()).save(Theme::Dark).unwrap();
        let manager = ThemeManager::load_theme(ThemeStore::new(path), Some(Theme::Vibrant));
        assert_eq!(manager.theme(), Theme::Vibrant);
    }

    #[test]
    fn test_persist_failure_still_applies_theme() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes the write fail.
        let path = dir.path().join("preferences.json");
        fs::create_dir(&path).unwrap();
        let mut manager = ThemeManager::load_theme(ThemeStore::new(path), None);
        assert!(manager.apply_theme(Theme::Dark).is_err());
        assert_eq!(manager.theme(), Theme::Dark);
    }
}
