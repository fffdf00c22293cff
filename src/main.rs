//! mdconvert - A terminal Markdown to HTML converter.
//!
//! # Usage
//!
//! ```bash
//! mdconvert                     # start with the sample text
//! mdconvert notes.md            # edit a copy of notes.md
//! mdconvert --theme dark --preview-style article notes.md
//! mdconvert --stdout notes.md > notes.html
//! ```

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mdconvert::app::App;
use mdconvert::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, preferences_path, save_config_flags,
};
use mdconvert::convert::{ComrakParser, MarkdownParser, SAMPLE_MARKDOWN};
use mdconvert::perf;
use mdconvert::pipeline::DEFAULT_DEBOUNCE_MS;
use mdconvert::theme::{PreviewStyle, Theme, ThemeStore};

/// A terminal Markdown to HTML converter with live preview
#[derive(Parser, Debug)]
#[command(name = "mdconvert", version, about, long_about = None)]
struct Cli {
    /// Markdown file to start from (the file itself is never written)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Color theme, overriding the saved preference
    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// Preview style to start with
    #[arg(long, value_enum)]
    preview_style: Option<PreviewStyle>,

    /// Quiet period after the last edit before converting
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Directory for converted.html and converted-styled.html
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Convert FILE (or stdin) to HTML on stdout and exit
    #[arg(long)]
    stdout: bool,

    /// Enable performance logging
    #[arg(long)]
    perf: bool,

    /// Write detailed render debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        // The TUI owns the screen; stderr output would tear it.
        None => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn convert_to_stdout(file: Option<&Path>) -> Result<()> {
    let text = read_input(file)?;
    let html = ComrakParser.parse_to_html(&text)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(html.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_deref())?;

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os(perf::RENDER_DEBUG_LOG_ENV).map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    if cli.stdout {
        return convert_to_stdout(cli.file.as_deref());
    }

    let initial_text = match cli.file.as_deref() {
        Some(path) => read_input(Some(path))?,
        None => SAMPLE_MARKDOWN.to_string(),
    };

    let mut app = App::new(initial_text)
        .with_debounce_ms(effective.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
        .with_output_dir(
            effective
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
        )
        .with_theme_store(ThemeStore::new(preferences_path()))
        .with_theme(effective.theme)
        .with_preview_style(effective.preview_style.unwrap_or_default())
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    tracing::info!(
        theme = ?effective.theme,
        preview_style = ?effective.preview_style,
        "starting"
    );
    app.run().context("Application error")
}
