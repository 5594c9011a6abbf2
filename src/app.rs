//! The app loop: frame scheduling, input integration, terminal lifecycle.
//!
//! Grounded on `pipeline/setup.rs::run_engine`'s unified-channel shape (a
//! stdin-reader thread and a resize-watcher thread both feeding one mpsc
//! channel the main loop blocks on) and `pipeline/terminal.rs::TerminalSetup`'s
//! scoped raw-mode acquisition with a `Drop` impl that restores unconditionally.
//! The reactive pipeline those files wire through `spark_signals` is replaced
//! here by directly calling [`crate::program::SerializedProgram::execute`]
//! against a [`crate::context::Context`] each frame.

use std::io::Write;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use crossterm::{execute, terminal};

use crate::ansi;
use crate::context::Context;
use crate::differ;
use crate::error::{Error, Result};
use crate::input::{self, RenderCause};
use crate::node::Node;
use crate::pool::BufferPool;
use crate::program::SerializedProgram;

/// How the app occupies the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Full alternate-screen takeover (the default).
    FullScreen,
    /// Renders into a limited vertical band at the current cursor position
    /// rather than an alternate screen.
    Inline { band_height: u16 },
    /// Skips the input reader entirely — useful for progress displays.
    RunNonInteractive,
}

/// Scoped raw-mode acquisition. Restoration runs from `Drop`, so it fires
/// on normal exit, early return, and unwind alike, with guaranteed release
/// on the panic path too.
struct RawModeGuard {
    alt_screen: bool,
}

impl RawModeGuard {
    fn enter(alt_screen: bool) -> Result<Self> {
        terminal::enable_raw_mode().map_err(|e| Error::TerminalUnavailable(e.to_string()))?;
        let mut stdout = std::io::stdout();
        if alt_screen {
            execute!(stdout, terminal::EnterAlternateScreen).map_err(Error::WriteFailed)?;
        }
        let mut hide = String::new();
        ansi::cursor_hide(&mut hide);
        stdout.write_all(hide.as_bytes()).map_err(Error::WriteFailed)?;
        Ok(Self { alt_screen })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let mut stdout = std::io::stdout();
        let mut show = String::new();
        ansi::cursor_show(&mut show);
        let _ = stdout.write_all(show.as_bytes());
        if self.alt_screen {
            let _ = execute!(stdout, terminal::LeaveAlternateScreen);
        }
        let _ = terminal::disable_raw_mode();
    }
}

enum LoopEvent {
    Input(Event),
    RenderRequest(RenderCause),
    Shutdown,
}

/// The frame loop itself. Owns the buffer pool, the compiled program, and
/// the application state context.
pub struct App {
    mode: Mode,
    pool: BufferPool,
    program: SerializedProgram,
    view: Node,
    width: u16,
    height: u16,
    _guard: Option<RawModeGuard>,
    requests: mpsc::Sender<LoopEvent>,
    inbox: mpsc::Receiver<LoopEvent>,
}

impl App {
    /// Query terminal size, enter raw mode, construct a pool sized to the
    /// terminal, and compile `view` immediately, since this engine has no
    /// use for an app with no view.
    pub fn new(mode: Mode, view: &Node) -> Result<Self> {
        crate::logging::init();
        let hints = crate::config::TerminalHints::detect()?;
        let (width, height) = match mode {
            Mode::Inline { band_height } => (hints.width, band_height),
            _ => (hints.width, hints.height),
        };

        let guard = if matches!(mode, Mode::RunNonInteractive) {
            None
        } else {
            Some(RawModeGuard::enter(matches!(mode, Mode::FullScreen))?)
        };

        let pool = BufferPool::new(width, height)?;
        let program = SerializedProgram::compile(view, width, height)?;
        let (requests, inbox) = mpsc::channel();

        Ok(Self { mode, pool, program, view: view.clone(), width, height, _guard: guard, requests, inbox })
    }

    /// Recompile the program against a new view (structural change).
    pub fn set_view(&mut self, view: &Node) -> Result<()> {
        self.program = SerializedProgram::compile(view, self.width, self.height)?;
        self.view = view.clone();
        Ok(())
    }

    /// Resize the buffer pool and recompile the program's layout against the
    /// current view at the new dimensions. Called after a terminal `Resize`
    /// event; without it the pool keeps serving stale-sized buffers and
    /// frames stay clipped to the old geometry forever.
    fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.width = width;
        self.height = height;
        self.pool.resize(width, height)?;
        self.program = SerializedProgram::compile(&self.view, width, height)?;
        Ok(())
    }

    pub fn request_render(&self) {
        let _ = self.requests.send(LoopEvent::RenderRequest(RenderCause::Explicit));
    }

    fn spawn_input_reader(&self) {
        if matches!(self.mode, Mode::RunNonInteractive) {
            return;
        }
        let tx = self.requests.clone();
        std::thread::spawn(move || loop {
            match event::poll(Duration::from_millis(50)) {
                Ok(true) => match event::read() {
                    Ok(ev @ Event::Resize(_, _)) => {
                        if tx.send(LoopEvent::Input(ev)).is_err() {
                            return;
                        }
                        if tx.send(LoopEvent::RenderRequest(RenderCause::Resize)).is_err() {
                            return;
                        }
                    }
                    Ok(ev) => {
                        if tx.send(LoopEvent::Input(ev)).is_err() {
                            return;
                        }
                        if tx.send(LoopEvent::RenderRequest(RenderCause::Input)).is_err() {
                            return;
                        }
                    }
                    Err(_) => return,
                },
                Ok(false) => continue,
                Err(_) => return,
            }
        });
    }

    /// Enter the main loop. `on_key` is invoked synchronously for every
    /// input event — handlers mutate `ctx` and may call
    /// [`Self::request_render`]. `tick` fires at the given interval as an
    /// internal render source.
    ///
    /// Render requests between two frames are coalesced: any number of
    /// requests queued while a frame is in flight collapse to a single
    /// redraw.
    pub fn run(
        &mut self,
        ctx: &mut Context,
        tick: Option<Duration>,
        mut on_key: impl FnMut(&str, &mut Context, &App),
    ) -> Result<()> {
        self.spawn_input_reader();
        self.render_frame(ctx)?;

        let deadline_step = tick.unwrap_or(Duration::from_millis(250));
        let mut next_tick = Instant::now() + deadline_step;

        loop {
            let now = Instant::now();
            let wait = next_tick.saturating_duration_since(now);
            let event = self.inbox.recv_timeout(wait);

            let mut should_render = false;
            match event {
                Ok(LoopEvent::Shutdown) => break,
                Ok(LoopEvent::Input(Event::Key(key))) => {
                    let id = input::key_id(key);
                    if !id.is_empty() {
                        on_key(&id, ctx, self);
                    }
                }
                Ok(LoopEvent::Input(Event::Resize(w, h))) => {
                    self.resize(w, h)?;
                }
                Ok(LoopEvent::Input(_)) => {}
                Ok(LoopEvent::RenderRequest(_)) => should_render = true,
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    should_render = tick.is_some();
                    next_tick = Instant::now() + deadline_step;
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }

            // Drain any further requests queued behind this one so a burst
            // of N requests between frames collapses to one render.
            while let Ok(next) = self.inbox.try_recv() {
                match next {
                    LoopEvent::Shutdown => return self.render_frame(ctx),
                    LoopEvent::RenderRequest(_) => should_render = true,
                    LoopEvent::Input(Event::Key(key)) => {
                        let id = input::key_id(key);
                        if !id.is_empty() {
                            on_key(&id, ctx, self);
                        }
                    }
                    LoopEvent::Input(Event::Resize(w, h)) => {
                        self.resize(w, h)?;
                    }
                    LoopEvent::Input(_) => {}
                }
            }

            if should_render {
                self.render_frame(ctx)?;
            }
        }
        Ok(())
    }

    fn render_frame(&mut self, ctx: &Context) -> Result<()> {
        let _span = tracing::trace_span!("render_frame", width = self.width, height = self.height).entered();
        let started = Instant::now();
        let current = self.pool.swap()?;
        debug_assert_eq!(current.width(), self.width);
        let mut scratch = current.clone();
        self.program.execute(&mut scratch, self.width, self.height, ctx)?;
        *self.pool.current_mut() = scratch;

        let mut patch = String::new();
        differ::diff_and_sync(self.pool.current_mut(), self.pool.displayed_mut(), &mut patch);
        if !patch.is_empty() {
            self.flush_patch(&patch)?;
        }
        tracing::debug!(elapsed_us = started.elapsed().as_micros() as u64, "frame rendered");
        Ok(())
    }

    /// Write a patch to the terminal, retrying once on failure. A second
    /// failure is surfaced to the caller, which tears the loop down — a
    /// terminal that can't accept output twice in a row isn't one `run`
    /// should keep rendering into.
    fn flush_patch(&self, patch: &str) -> Result<()> {
        let mut stdout = std::io::stdout();
        match stdout.write_all(patch.as_bytes()).and_then(|_| stdout.flush()) {
            Ok(()) => Ok(()),
            Err(_) => stdout.write_all(patch.as_bytes()).and_then(|_| stdout.flush()).map_err(Error::WriteFailed),
        }
    }

    /// Request loop exit. `run` returns after draining pending renders and
    /// restoring the terminal (the latter happens via `Drop` on the raw-mode
    /// guard once `self` is dropped).
    pub fn stop(&self) {
        let _ = self.requests.send(LoopEvent::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_non_interactive_mode_skips_raw_mode_guard() {
        let view = Node::text("hi");
        let app = App::new(Mode::RunNonInteractive, &view);
        assert!(app.is_ok());
        assert!(app.unwrap()._guard.is_none());
    }
}
