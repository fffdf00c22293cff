//! Timing scopes and the render debug log.
//!
//! Timing is off unless `--perf` is given. The debug log is a plain text
//! file of timestamped `name: detail` lines, opened with
//! `--render-debug-log` or [`RENDER_DEBUG_LOG_ENV`].

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::Instant;

/// Environment variable naming a render debug log file.
pub const RENDER_DEBUG_LOG_ENV: &str = "MDCONVERT_RENDER_DEBUG_LOG";

static TIMING: AtomicBool = AtomicBool::new(false);
static DEBUG_LOG: LazyLock<Mutex<Option<DebugLog>>> = LazyLock::new(|| Mutex::new(None));

#[derive(Debug)]
struct DebugLog {
    opened_at: Instant,
    writer: BufWriter<File>,
}

impl DebugLog {
    fn create(path: &Path) -> io::Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "mdconvert render debug log start")?;
        writer.flush()?;
        Ok(Self {
            opened_at: Instant::now(),
            writer,
        })
    }

    fn write_line(&mut self, name: &str, detail: &str) -> io::Result<()> {
        let at_ms = self.opened_at.elapsed().as_secs_f64() * 1000.0;
        writeln!(self.writer, "[{at_ms:>10.3} ms] {name}: {detail}")?;
        self.writer.flush()
    }
}

fn debug_log() -> MutexGuard<'static, Option<DebugLog>> {
    DEBUG_LOG.lock().expect("debug log lock poisoned")
}

/// A timed region. Reports its duration when dropped, if timing is on.
#[derive(Debug)]
#[must_use = "a scope measures until it is dropped"]
pub struct Scope {
    name: &'static str,
    started: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(target: "mdconvert::perf", scope = self.name, elapsed_ms);
        log_event(self.name, format!("{elapsed_ms:.2} ms"));
    }
}

/// Start timing `name`.
pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        started: Instant::now(),
    }
}

pub fn set_enabled(enabled: bool) {
    TIMING.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    TIMING.load(Ordering::Relaxed)
}

/// Open the debug log at `path`, truncating it, or close it with `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or the header written.
pub fn set_debug_log_path(path: Option<&Path>) -> io::Result<()> {
    let next = path.map(DebugLog::create).transpose()?;
    *debug_log() = next;
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    debug_log().is_some()
}

/// Append a line to the debug log, if one is open. Write errors are dropped.
pub fn log_event(name: &str, detail: impl AsRef<str>) {
    if let Some(log) = debug_log().as_mut() {
        let _ = log.write_line(name, detail.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_timing_flag_toggles() {
        set_enabled(true);
        assert!(is_enabled());
        drop(scope("test.scope"));

        set_enabled(false);
        assert!(!is_enabled());
    }

    #[test]
    fn test_debug_log_opens_writes_and_closes() {
        let temp_file = NamedTempFile::new().unwrap();
        set_debug_log_path(Some(temp_file.path())).unwrap();
        assert!(is_debug_log_enabled());
        log_event("test.event", "hello world");
        set_debug_log_path(None).unwrap();
        assert!(!is_debug_log_enabled());
        log_event("test.after_close", "dropped");

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.starts_with("mdconvert render debug log start\n"));
        assert!(content.contains("] test.event: hello world"));
        assert!(!content.contains("dropped"));
    }

    #[test]
    fn test_unwritable_log_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir").join("render.log");
        assert!(set_debug_log_path(Some(&missing)).is_err());
    }
}
