use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::clipboard::{CopyTask, Osc52Clipboard};
use crate::pipeline::RenderPipeline;
use crate::theme::ThemeManager;

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal: mdconvert requires an interactive terminal")?;
        let size = terminal.size()?;
        drop(init_scope);

        let themes = ThemeManager::load_theme(self.theme_store.clone(), self.theme_preset);
        let mut model = Model::new(&self.initial_text, (size.width, size.height), themes)
            .with_pipeline(RenderPipeline::new(self.debounce_ms));
        model.themes.apply_preview_style(self.preview_style);
        model.output_dir.clone_from(&self.output_dir);
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        crate::perf::log_event(
            "init.layout",
            format!(
                "terminal={}x{} theme={} style={}",
                size.width,
                size.height,
                model.themes.theme().name(),
                model.themes.preview_style().name()
            ),
        );
        Self::render_logged(&mut model);

        let result = execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)
            .context("Failed to enable mouse capture")
            .and_then(|()| Self::event_loop(&mut terminal, &mut model));

        let _ = execute!(stdout(), DisableBracketedPaste, DisableMouseCapture);
        ratatui::restore();

        result
    }

    fn apply_message(
        model: &mut Model,
        copy_task: &mut Option<CopyTask>,
        msg: Message,
        now_ms: u64,
    ) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        if model.schedule_render_if_edited(now_ms) {
            crate::perf::log_event("render.scheduled", format!("at_ms={now_ms}"));
        }
        Self::handle_message_side_effects(model, copy_task, &side_msg);
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let mut copy_task: Option<CopyTask> = None;
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            if model.pipeline.take_due(now_ms) {
                crate::perf::log_event("render.debounced", format!("frame={frame_idx}"));
                Self::render_logged(model);
                needs_render = true;
            }

            if let Some(result) = copy_task.as_ref().and_then(CopyTask::try_finish) {
                if let Some(task) = copy_task.take() {
                    Self::finish_copy(model, result, task.payload(), &mut Osc52Clipboard::stdout());
                }
                needs_render = true;
            }

            let poll_ms = if needs_render {
                0
            } else if model.pipeline.is_pending()
                || copy_task.is_some()
                || model.active_toast().is_some()
            {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so the debounce uses accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if let Some(msg) = Self::handle_event(&event::read()?, model) {
                    crate::perf::log_event(
                        "event.message",
                        format!("frame={frame_idx} msg={msg:?}"),
                    );
                    Self::apply_message(model, &mut copy_task, msg, event_ms);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single draw.
                let mut drained = 0_u32;
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if let Some(msg) = Self::handle_event(&event::read()?, model) {
                        drained += 1;
                        Self::apply_message(model, &mut copy_task, msg, drain_ms);
                        needs_render = true;
                    }
                    if model.should_quit {
                        break;
                    }
                }
                if drained > 0 {
                    crate::perf::log_event(
                        "event.drain",
                        format!("frame={frame_idx} drained={drained}"),
                    );
                }
            }

            if model.should_quit {
                break;
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| Self::view(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }
        }
        Ok(())
    }
}
