//! Copying HTML to the clipboard.
//!
//! The system clipboard is written from a worker thread so a slow clipboard
//! daemon never stalls the UI. When it fails, the event loop falls back to an
//! OSC 52 escape sequence, which most terminals forward to the host clipboard.

use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("system clipboard unavailable: {0}")]
    System(#[from] arboard::Error),
    #[error("terminal write failed: {0}")]
    Io(#[from] io::Error),
    #[error("clipboard worker exited without a result")]
    WorkerGone,
}

/// Something that can receive copied text.
pub trait ClipboardBackend: Send {
    /// Put `text` on the clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error when the clipboard rejects the write.
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The OS clipboard, via arboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardBackend for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_string())?;
        Ok(())
    }
}

/// Clipboard writes as OSC 52 sequences on a terminal stream.
#[derive(Debug)]
pub struct Osc52Clipboard<W> {
    out: W,
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> Osc52Clipboard<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ClipboardBackend for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.out.write_all(osc52_sequence(text).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Build the OSC 52 "set clipboard" sequence for `text`.
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

/// A clipboard write running on a worker thread.
#[derive(Debug)]
pub struct CopyTask {
    payload: String,
    rx: Receiver<Result<(), ClipboardError>>,
}

impl CopyTask {
    /// Copy `payload` to the system clipboard in the background.
    pub fn spawn(payload: String) -> Self {
        Self::spawn_with(payload, SystemClipboard)
    }

    pub fn spawn_with<B: ClipboardBackend + 'static>(payload: String, mut backend: B) -> Self {
        let (tx, rx) = mpsc::channel();
        let text = payload.clone();
        thread::spawn(move || {
            let _scope = crate::perf::scope("clipboard.worker");
            let _ = tx.send(backend.set_text(&text));
        });
        Self { payload, rx }
    }

    /// The result, once the worker has finished.
    pub fn try_finish(&self) -> Option<Result<(), ClipboardError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ClipboardError::WorkerGone)),
        }
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    #[derive(Clone, Default)]
    struct RecordingClipboard {
        copied: Arc<Mutex<Vec<String>>>,
    }

    impl ClipboardBackend for RecordingClipboard {
        fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.copied.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct BrokenClipboard;

    impl ClipboardBackend for BrokenClipboard {
        fn set_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Io(io::Error::other("no display")))
        }
    }

    fn wait_for(task: &CopyTask) -> Result<(), ClipboardError> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = task.try_finish() {
                return result;
            }
            assert!(Instant::now() < deadline, "copy task never finished");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_osc52_sequence_encodes_text() {
        let seq = osc52_sequence("hi");
        assert_eq!(seq, "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_osc52_clipboard_writes_sequence() {
        let mut clipboard = Osc52Clipboard::new(Vec::new());
        clipboard.set_text("<p>x</p>").unwrap();
        let written = String::from_utf8(clipboard.into_inner()).unwrap();
        assert_eq!(written, osc52_sequence("<p>x</p>"));
    }

    #[test]
    fn test_copy_task_delivers_payload() {
        let backend = RecordingClipboard::default();
        let task = CopyTask::spawn_with("<h1>Hi</h1>\n".to_string(), backend.clone());
        wait_for(&task).unwrap();
        assert_eq!(task.payload(), "<h1>Hi</h1>\n");
        assert_eq!(*backend.copied.lock().unwrap(), vec!["<h1>Hi</h1>\n"]);
    }

    #[test]
    fn test_copy_task_reports_failure() {
        let task = CopyTask::spawn_with("x".to_string(), BrokenClipboard);
        assert!(matches!(wait_for(&task), Err(ClipboardError::Io(_))));
    }
}
