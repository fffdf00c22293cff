use std::time::Duration;

use crate::app::{App, Message, Model, ToastLevel};
use crate::clipboard::{ClipboardBackend, ClipboardError, CopyTask};
use crate::convert::{
    DOWNLOAD_FILE_NAME, STYLED_EXPORT_FILE_NAME, standalone_document, styled_document,
};
use crate::export::write_export;

const COPY_OK_TOAST: Duration = Duration::from_millis(1100);
const COPY_FAILED_TOAST: Duration = Duration::from_millis(1800);

impl App {
    /// Run the side effects of a message after `update` has applied it.
    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        copy_task: &mut Option<CopyTask>,
        msg: &Message,
    ) {
        match msg {
            Message::CycleTheme => {
                let next = model.themes.theme().next();
                Self::switch_theme(model, next);
            }
            Message::SetTheme(theme) => Self::switch_theme(model, *theme),
            Message::CyclePreviewStyle | Message::SetPreviewStyle(_) | Message::ConfirmReset => {
                Self::render_logged(model);
            }
            Message::CopyHtml => {
                if copy_task.is_some() {
                    return;
                }
                Self::flush_pending_render(model);
                *copy_task = Some(CopyTask::spawn(model.pipeline.output().html.clone()));
            }
            Message::DownloadHtml => Self::download_html(model),
            Message::ExportStyled => Self::export_styled(model),
            _ => {}
        }
    }

    /// Report a finished clipboard write. On failure the payload is retried
    /// through `fallback` before giving up.
    pub(super) fn finish_copy(
        model: &mut Model,
        result: Result<(), ClipboardError>,
        payload: &str,
        fallback: &mut impl ClipboardBackend,
    ) {
        match result {
            Ok(()) => model.show_toast_for(ToastLevel::Info, "Copied!", COPY_OK_TOAST),
            Err(err) => {
                tracing::warn!(error = %err, "system clipboard failed, trying OSC 52");
                match fallback.set_text(payload) {
                    Ok(()) => model.show_toast_for(ToastLevel::Info, "Copied!", COPY_OK_TOAST),
                    Err(fallback_err) => {
                        tracing::error!(error = %fallback_err, "copy failed");
                        model.show_toast_for(ToastLevel::Error, "Copy failed", COPY_FAILED_TOAST);
                    }
                }
            }
        }
    }

    fn switch_theme(model: &mut Model, theme: crate::theme::Theme) {
        if let Err(err) = model.themes.apply_theme(theme) {
            tracing::warn!(error = %err, theme = theme.name(), "failed to persist theme");
            model.show_toast(ToastLevel::Warning, format!("Theme not saved: {err:#}"));
        }
        Self::render_logged(model);
    }

    /// Render immediately. Failures are logged and the last good output stays up.
    pub(super) fn render_logged(model: &mut Model) {
        if let Err(err) = model.render_now() {
            tracing::error!(error = %err, "render failed");
            crate::perf::log_event("render.error", err.to_string());
        }
    }

    /// Actions read the converted output, so bring it up to date first.
    fn flush_pending_render(model: &mut Model) {
        if model.render_outdated() {
            Self::render_logged(model);
        }
    }

    fn download_html(model: &mut Model) {
        Self::flush_pending_render(model);
        let document = standalone_document(&model.pipeline.output().html);
        match write_export(&model.output_dir, DOWNLOAD_FILE_NAME, &document) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "saved download");
                model.show_toast(ToastLevel::Info, format!("Saved {DOWNLOAD_FILE_NAME}"));
            }
            Err(err) => {
                tracing::error!(error = %err, "download failed");
                model.show_toast(ToastLevel::Error, format!("Download failed: {err:#}"));
            }
        }
    }

    fn export_styled(model: &mut Model) {
        Self::flush_pending_render(model);
        let document = styled_document(
            &model.pipeline.output().wrapped,
            model.themes.style_slot().css(),
        );
        match write_export(&model.output_dir, STYLED_EXPORT_FILE_NAME, &document) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "saved styled export");
                model.show_toast(
                    ToastLevel::Info,
                    format!("Saved {STYLED_EXPORT_FILE_NAME}"),
                );
            }
            Err(err) => {
                tracing::error!(error = %err, "styled export failed");
                model.show_toast(ToastLevel::Error, format!("Export failed: {err:#}"));
            }
        }
    }
}
