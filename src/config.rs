use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::theme::{PreviewStyle, Theme};

const APP_DIR: &str = "mdconvert";
const LOCAL_OVERRIDE: &str = ".mdconvertrc";

/// Flags that can be saved as defaults with `--save`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub theme: Option<Theme>,
    pub preview_style: Option<PreviewStyle>,
    pub debounce_ms: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub perf: bool,
    pub render_debug_log: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge with `other` taking precedence for valued options.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            theme: other.theme.or(self.theme),
            preview_style: other.preview_style.or(self.preview_style),
            debounce_ms: other.debounce_ms.or(self.debounce_ms),
            output_dir: other
                .output_dir
                .clone()
                .or_else(|| self.output_dir.clone()),
            perf: self.perf || other.perf,
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join(APP_DIR));
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(APP_DIR),
            );
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join(APP_DIR));
        }
        if let Some(home) = std::env::var_os("HOME") {
            return Some(PathBuf::from(home).join(".config").join(APP_DIR));
        }
    }

    None
}

pub fn global_config_path() -> PathBuf {
    config_dir().map_or_else(|| PathBuf::from(LOCAL_OVERRIDE), |dir| dir.join("config"))
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_OVERRIDE)
}

/// Preferences file holding the persisted theme, next to the global config.
pub fn preferences_path() -> PathBuf {
    config_dir().map_or_else(
        || PathBuf::from(".mdconvert-preferences.json"),
        |dir| dir.join("preferences.json"),
    )
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# mdconvert defaults (saved with --save)".to_string()];
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.name()));
    }
    if let Some(style) = flags.preview_style {
        lines.push(format!("--preview-style {}", style.name()));
    }
    if let Some(ms) = flags.debounce_ms {
        lines.push(format!("--debounce-ms {ms}"));
    }
    if let Some(dir) = &flags.output_dir {
        lines.push(format!("--output-dir {}", dir.display()));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from a token list. Unknown tokens are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        if name == "--perf" {
            flags.perf = true;
            i += 1;
            continue;
        }

        let takes_value = matches!(
            name,
            "--theme"
                | "--preview-style"
                | "--debounce-ms"
                | "--output-dir"
                | "--render-debug-log"
                | "--log-file"
        );
        if !takes_value {
            i += 1;
            continue;
        }
        let value = match inline_value {
            Some(value) => Some(value),
            None => {
                let next = tokens.get(i + 1).map(String::as_str);
                if next.is_some() {
                    i += 1;
                }
                next
            }
        };
        if let Some(value) = value {
            apply_flag_value(&mut flags, name, value);
        }
        i += 1;
    }
    flags
}

fn apply_flag_value(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--theme" => flags.theme = Theme::from_name(value),
        "--preview-style" => flags.preview_style = Some(PreviewStyle::from_name(value)),
        "--debounce-ms" => flags.debounce_ms = value.parse().ok(),
        "--output-dir" => flags.output_dir = Some(PathBuf::from(value)),
        "--render-debug-log" => flags.render_debug_log = Some(PathBuf::from(value)),
        "--log-file" => flags.log_file = Some(PathBuf::from(value)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "mdconvert",
            "--theme",
            "vibrant",
            "--preview-style=technical",
            "--debounce-ms",
            "200",
            "--render-debug-log=render.log",
            "--perf",
            "README.md",
        ]));
        assert_eq!(flags.theme, Some(Theme::Vibrant));
        assert_eq!(flags.preview_style, Some(PreviewStyle::Technical));
        assert_eq!(flags.debounce_ms, Some(200));
        assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
        assert!(flags.perf);
    }

    #[test]
    fn test_parse_flag_tokens_ignores_bad_values() {
        let flags = parse_flag_tokens(&tokens(&["--theme", "neon", "--debounce-ms", "soon"]));
        assert_eq!(flags.theme, None);
        assert_eq!(flags.debounce_ms, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            perf: true,
            theme: Some(Theme::Light),
            output_dir: Some(PathBuf::from("out")),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            theme: Some(Theme::Dark),
            debounce_ms: Some(50),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.perf);
        assert_eq!(merged.theme, Some(Theme::Dark));
        assert_eq!(merged.debounce_ms, Some(50));
        assert_eq!(merged.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".mdconvertrc");
        let flags = ConfigFlags {
            theme: Some(Theme::Dark),
            preview_style: Some(PreviewStyle::Elegant),
            debounce_ms: Some(90),
            output_dir: Some(PathBuf::from("exports")),
            perf: true,
            render_debug_log: Some(PathBuf::from("render.log")),
            log_file: Some(PathBuf::from("mdconvert.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
