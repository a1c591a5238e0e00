//! Interactive terminal application.
//!
//! Owns the poll session, the latest snapshot and the monitor state, and
//! turns key presses into [`MonitorAction`]s.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};
use tracing::{info, warn};

use crate::action::MonitorAction;
use crate::config::MonitorConfig;
use crate::error::MonitorResult;
use crate::keys::resolve_key;
use crate::monitor::{MonitorCallbacks, MonitorProps, MonitorState, TerminalMonitor};
use crate::poller::{PollEvent, PollSettings, Poller};
use crate::snapshot::MetricsSnapshot;
use crate::source::SnapshotSource;

/// Upper bound on how long the loop waits for a key before redrawing.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Builds a fresh source for each poll session.
pub type SourceFactory = Box<dyn Fn() -> MonitorResult<Box<dyn SnapshotSource>>>;

/// RAII guard to ensure terminal state is restored even on panic.
struct TerminalCleanup;

impl Drop for TerminalCleanup {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

pub struct App<'a> {
    config: MonitorConfig,
    factory: SourceFactory,
    callbacks: MonitorCallbacks<'a>,
    poller: Option<Poller>,
    metrics: Option<MetricsSnapshot>,
    loading: bool,
    error: Option<String>,
    state: MonitorState,
    should_quit: bool,
    needs_clear: bool,
}

impl<'a> App<'a> {
    pub fn new(
        config: MonitorConfig,
        factory: SourceFactory,
        callbacks: MonitorCallbacks<'a>,
    ) -> Self {
        Self {
            config,
            factory,
            callbacks,
            poller: None,
            metrics: None,
            loading: false,
            error: None,
            state: MonitorState::default(),
            should_quit: false,
            needs_clear: false,
        }
    }

    /// Start a poll session. The monitor shows the loading screen until the
    /// first snapshot or failure arrives.
    pub fn start(&mut self) -> MonitorResult<()> {
        let source = (self.factory)()?;
        self.poller = Some(Poller::spawn(source, PollSettings::from_config(&self.config))?);
        self.loading = true;
        Ok(())
    }

    /// Drop everything and start over, as if the monitor had just launched.
    ///
    /// A session that fails to start is shown on the error screen so the
    /// operator can retry.
    pub fn reload(&mut self) {
        info!("Reloading monitor");
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        self.metrics = None;
        self.error = None;
        self.loading = false;
        self.state.reset();
        self.needs_clear = true;

        if let Err(e) = self.start() {
            warn!(error = %e, "Failed to restart poller");
            self.loading = false;
            self.error = Some(e.to_string());
        }
    }

    pub fn apply(&mut self, event: PollEvent) {
        match event {
            PollEvent::Started => self.loading = true,
            PollEvent::Snapshot(snapshot) => {
                self.metrics = Some(*snapshot);
                self.error = None;
                self.loading = false;
            }
            PollEvent::Failed(message) => {
                self.error = Some(message);
                self.loading = false;
            }
        }
    }

    /// Apply every event the poller has sent since the last call.
    pub fn pump(&mut self) {
        let Some(poller) = &self.poller else {
            return;
        };
        match poller.try_events() {
            Ok(events) => {
                for event in events {
                    self.apply(event);
                }
            }
            Err(e) => {
                warn!(error = %e, "Poller stopped unexpectedly");
                self.poller = None;
                self.loading = false;
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn props(&self) -> MonitorProps<'_> {
        MonitorProps {
            metrics: self.metrics.as_ref(),
            loading: self.loading,
            error: self.error.as_deref(),
            available: self.callbacks.available(),
        }
    }

    pub fn monitor(&self) -> TerminalMonitor<'_> {
        TerminalMonitor::new(self.props(), &self.config)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> MonitorResult<()> {
        let shortcuts = self.monitor().shortcuts();
        match resolve_key(&key, &shortcuts) {
            Some(action) => self.dispatch(action),
            None => Ok(()),
        }
    }

    pub fn dispatch(&mut self, action: MonitorAction) -> MonitorResult<()> {
        match action {
            MonitorAction::Pause | MonitorAction::Resume | MonitorAction::Cancel => {
                let job_id = match &self.metrics {
                    Some(metrics) => metrics.job_id.clone(),
                    None => return Ok(()),
                };
                match self.callbacks.invoke(action, &job_id) {
                    Ok(_) => info!(%job_id, %action, "Job control requested"),
                    Err(e) => warn!(%job_id, %action, error = %e, "Job control failed"),
                }
            }
            MonitorAction::Refresh => self.reload(),
            MonitorAction::Quit => self.should_quit = true,
            MonitorAction::ScrollLogsUp => self.state.logs.scroll_up(1),
            MonitorAction::ScrollLogsDown => self.state.logs.scroll_down(1),
        }
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let monitor = TerminalMonitor::new(
            MonitorProps {
                metrics: self.metrics.as_ref(),
                loading: self.loading,
                error: self.error.as_deref(),
                available: self.callbacks.available(),
            },
            &self.config,
        );
        frame.render_stateful_widget(monitor, frame.area(), &mut self.state);
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn metrics(&self) -> Option<&MetricsSnapshot> {
        self.metrics.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Take over the terminal and run until the operator quits.
    pub fn run(&mut self) -> MonitorResult<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Restores the terminal on early return or panic.
        let cleanup = TerminalCleanup;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        if self.poller.is_none() {
            self.start()?;
        }
        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        std::mem::forget(cleanup);

        result
    }

    fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> MonitorResult<()> {
        while !self.should_quit {
            self.pump();

            if std::mem::take(&mut self.needs_clear) {
                terminal.clear()?;
            }
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(INPUT_POLL)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key)?;
                }
            }
        }

        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        Ok(())
    }
}
