//! Monitor root.
//!
//! Resolves which screen to show from `(metrics, loading, error)`, lays the
//! panels out, and derives the shortcut legend from the supplied callbacks
//! and the job status. Callbacks are forwarded verbatim; nothing here keeps
//! optimistic job state.

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, StatefulWidget, Widget, Wrap};

use crate::action::{AvailableActions, MonitorAction};
use crate::config::MonitorConfig;
use crate::error::MonitorResult;
use crate::keys::default_key;
use crate::panels::{
    PanelFrame, TerminalCheckpoint, TerminalGpu, TerminalHeader, TerminalLogs, TerminalMetrics,
    TerminalPerformance, TerminalProgress,
};
use crate::snapshot::{JobStatus, MetricsSnapshot};
use crate::theme::colors;
use crate::widgets::{KeyboardShortcuts, LogStreamState, ShortcutAction};

const UPDATING_LABEL: &str = " ● updating ";

/// Which screen the monitor shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorView {
    Error(String),
    Loading,
    NoMetrics,
    /// Panels are shown. `updating` is set while a refresh is in flight.
    Ready { updating: bool },
}

impl MonitorView {
    /// An error wins over everything, then loading without data, then the
    /// empty screen.
    pub fn resolve(metrics: Option<&MetricsSnapshot>, loading: bool, error: Option<&str>) -> Self {
        if let Some(error) = error.filter(|e| !e.is_empty()) {
            return Self::Error(error.to_string());
        }
        match metrics {
            None if loading => Self::Loading,
            None => Self::NoMetrics,
            Some(_) => Self::Ready { updating: loading },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Job-control callback. Receives the job id.
pub type ActionCallback<'a> = Box<dyn FnMut(&str) -> MonitorResult<()> + 'a>;

/// Pause, resume and cancel handlers supplied by the host.
#[derive(Default)]
pub struct MonitorCallbacks<'a> {
    pub on_pause: Option<ActionCallback<'a>>,
    pub on_resume: Option<ActionCallback<'a>>,
    pub on_cancel: Option<ActionCallback<'a>>,
}

impl<'a> MonitorCallbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pause(mut self, f: impl FnMut(&str) -> MonitorResult<()> + 'a) -> Self {
        self.on_pause = Some(Box::new(f));
        self
    }

    pub fn on_resume(mut self, f: impl FnMut(&str) -> MonitorResult<()> + 'a) -> Self {
        self.on_resume = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl FnMut(&str) -> MonitorResult<()> + 'a) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn available(&self) -> AvailableActions {
        AvailableActions {
            pause: self.on_pause.is_some(),
            resume: self.on_resume.is_some(),
            cancel: self.on_cancel.is_some(),
        }
    }

    /// Forward `action` for `job_id` to its callback.
    ///
    /// Returns `Ok(false)` when the action is not a job-control action or no
    /// callback was supplied for it.
    pub fn invoke(&mut self, action: MonitorAction, job_id: &str) -> MonitorResult<bool> {
        let callback = match action {
            MonitorAction::Pause => self.on_pause.as_mut(),
            MonitorAction::Resume => self.on_resume.as_mut(),
            MonitorAction::Cancel => self.on_cancel.as_mut(),
            _ => None,
        };
        match callback {
            Some(callback) => {
                callback(job_id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn shortcut(action: MonitorAction) -> ShortcutAction {
    ShortcutAction::for_action(default_key(action), action)
}

/// Shortcut set for the current render.
///
/// One entry per supplied job-control callback, disabled when `status` does
/// not allow it (or is unknown), followed by refresh and quit. Log scrolling
/// is listed only when a job is on screen.
pub fn build_shortcuts(
    available: AvailableActions,
    status: Option<JobStatus>,
) -> Vec<ShortcutAction> {
    let mut shortcuts = Vec::with_capacity(7);

    if available.cancel {
        let enabled = status.is_some_and(|s| s.can_cancel());
        shortcuts.push(shortcut(MonitorAction::Cancel).disabled(!enabled));
    }
    if available.pause {
        let enabled = status.is_some_and(|s| s.can_pause());
        shortcuts.push(shortcut(MonitorAction::Pause).disabled(!enabled));
    }
    if available.resume {
        let enabled = status.is_some_and(|s| s.can_resume());
        shortcuts.push(shortcut(MonitorAction::Resume).disabled(!enabled));
    }

    shortcuts.push(shortcut(MonitorAction::Refresh));
    shortcuts.push(shortcut(MonitorAction::Quit));

    if status.is_some() {
        shortcuts.push(shortcut(MonitorAction::ScrollLogsUp));
        shortcuts.push(shortcut(MonitorAction::ScrollLogsDown));
    }
    shortcuts
}

/// Inputs of one render.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorProps<'a> {
    pub metrics: Option<&'a MetricsSnapshot>,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub available: AvailableActions,
}

/// State kept between renders.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub logs: LogStreamState,
}

impl MonitorState {
    pub fn reset(&mut self) {
        self.logs.reset();
    }
}

/// The whole monitor screen.
pub struct TerminalMonitor<'a> {
    props: MonitorProps<'a>,
    frame: PanelFrame,
    max_log_lines: usize,
    sparkline_height: u16,
    trend_decimals: usize,
    compact_shortcuts: bool,
}

impl<'a> TerminalMonitor<'a> {
    pub fn new(props: MonitorProps<'a>, config: &MonitorConfig) -> Self {
        Self {
            props,
            frame: PanelFrame::from_config(config),
            max_log_lines: config.max_log_lines,
            sparkline_height: config.sparkline_height,
            trend_decimals: config.trend_decimals,
            compact_shortcuts: config.compact_shortcuts,
        }
    }

    pub fn view(&self) -> MonitorView {
        MonitorView::resolve(self.props.metrics, self.props.loading, self.props.error)
    }

    /// Shortcuts shown in the legend, and the only ones key handling resolves.
    pub fn shortcuts(&self) -> Vec<ShortcutAction> {
        match (self.view(), self.props.metrics) {
            (MonitorView::Ready { .. }, Some(metrics)) => {
                build_shortcuts(self.props.available, Some(metrics.status))
            }
            _ => vec![shortcut(MonitorAction::Refresh), shortcut(MonitorAction::Quit)],
        }
    }

    fn render_legend(&self, shortcuts: &[ShortcutAction], area: Rect, buf: &mut Buffer) {
        KeyboardShortcuts::new(shortcuts)
            .compact(self.compact_shortcuts)
            .render(area, buf);
    }

    /// Message screen used for loading, error and empty states.
    fn render_message(&self, lines: Vec<Line<'static>>, area: Rect, buf: &mut Buffer) {
        let [body, legend] = split_legend(area);
        let height = lines.len() as u16;
        let top = body.y + body.height.saturating_sub(height) / 2;
        let message_area = Rect {
            y: top,
            height: height.min(body.height),
            ..body
        };
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(message_area, buf);
        self.render_legend(&self.shortcuts(), legend, buf);
    }

    fn render_error(&self, message: &str, area: Rect, buf: &mut Buffer) {
        let [body, legend] = split_legend(area);
        let boxed = self.frame.boxed("ERROR", body);
        let inner = boxed.inner(body).intersection(buf.area);
        boxed.render(body, buf);
        if !inner.is_empty() {
            Paragraph::new(vec![
                Line::styled(
                    "✗ Failed to load job metrics",
                    Style::default()
                        .fg(colors::ERROR)
                        .add_modifier(Modifier::BOLD),
                ),
                Line::default(),
                Line::styled(message.to_string(), Style::default().fg(colors::TEXT)),
            ])
            .wrap(Wrap { trim: true })
            .render(inner, buf);
        }
        self.render_legend(&self.shortcuts(), legend, buf);
    }

    fn render_ready(
        &self,
        metrics: &MetricsSnapshot,
        updating: bool,
        area: Rect,
        buf: &mut Buffer,
        state: &mut MonitorState,
    ) {
        let banner_height = u16::from(metrics.warning.is_some());
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(banner_height), // Stale-job warning
                Constraint::Length(4),             // Header
                Constraint::Min(12),               // Panels
                Constraint::Length(10),            // Logs
                Constraint::Length(1),             // Legend
            ])
            .split(area);

        if let Some(warning) = &metrics.warning {
            Paragraph::new(Line::from(vec![
                Span::styled(" ! ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(warning.clone()),
            ]))
            .style(Style::default().fg(colors::WARNING).bg(colors::BANNER_BG))
            .render(rows[0], buf);
        }

        TerminalHeader::new(metrics, self.props.available)
            .frame(self.frame)
            .render(rows[1], buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[2]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(columns[0]);
        TerminalProgress::new(metrics)
            .frame(self.frame)
            .render(left[0], buf);
        TerminalMetrics::new(metrics)
            .frame(self.frame)
            .sparkline_height(self.sparkline_height)
            .decimals(self.trend_decimals)
            .render(left[1], buf);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(5),
                Constraint::Min(0),
            ])
            .split(columns[1]);
        TerminalGpu::new(metrics.gpu.as_ref())
            .frame(self.frame)
            .render(right[0], buf);
        TerminalPerformance::new(metrics)
            .frame(self.frame)
            .render(right[1], buf);
        TerminalCheckpoint::new(metrics.best_checkpoint.as_ref())
            .frame(self.frame)
            .render(right[2], buf);

        TerminalLogs::new(&metrics.recent_logs)
            .max_lines(self.max_log_lines)
            .frame(self.frame)
            .render(rows[3], buf, &mut state.logs);

        self.render_legend(&self.shortcuts(), rows[4], buf);

        if updating {
            render_updating(area, buf);
        }
    }
}

fn split_legend(area: Rect) -> [Rect; 2] {
    let legend_height = area.height.min(1);
    [
        Rect {
            height: area.height - legend_height,
            ..area
        },
        Rect {
            y: area.y + area.height - legend_height,
            height: legend_height,
            ..area
        },
    ]
}

/// Floating badge in the top-right corner, drawn over whatever is there.
fn render_updating(area: Rect, buf: &mut Buffer) {
    let width = (UPDATING_LABEL.chars().count() as u16).min(area.width);
    if width == 0 || area.height == 0 {
        return;
    }
    let badge = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height: 1,
    };
    Clear.render(badge, buf);
    Paragraph::new(Span::styled(
        UPDATING_LABEL,
        Style::default()
            .fg(colors::UPDATING)
            .add_modifier(Modifier::BOLD),
    ))
    .render(badge, buf);
}

impl StatefulWidget for TerminalMonitor<'_> {
    type State = MonitorState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let area = area.intersection(buf.area);
        if area.is_empty() {
            return;
        }

        match (self.view(), self.props.metrics) {
            (MonitorView::Error(message), _) => self.render_error(&message, area, buf),
            (MonitorView::Ready { updating }, Some(metrics)) => {
                self.render_ready(metrics, updating, area, buf, state)
            }
            (MonitorView::Loading, _) => self.render_message(
                vec![
                    Line::styled(
                        "⟳",
                        Style::default()
                            .fg(colors::INFO)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Line::styled("Loading job metrics...", Style::default().fg(colors::TEXT)),
                ],
                area,
                buf,
            ),
            _ => self.render_message(
                vec![Line::styled(
                    "No metrics available for this job yet",
                    Style::default().fg(colors::MUTED),
                )],
                area,
                buf,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::buffer_to_plain;
    use std::cell::RefCell;

    fn render(monitor: TerminalMonitor<'_>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        let mut state = MonitorState::default();
        monitor.render(area, &mut buf, &mut state);
        buffer_to_plain(&buf)
    }

    fn running() -> MetricsSnapshot {
        MetricsSnapshot {
            job_id: "ft-1".into(),
            status: JobStatus::Running,
            ..Default::default()
        }
    }

    #[test]
    fn test_view_precedence() {
        let snapshot = running();
        assert_eq!(MonitorView::resolve(None, true, None), MonitorView::Loading);
        assert_eq!(MonitorView::resolve(None, false, None), MonitorView::NoMetrics);
        assert_eq!(
            MonitorView::resolve(Some(&snapshot), true, Some("X")),
            MonitorView::Error("X".into())
        );
        assert_eq!(
            MonitorView::resolve(None, true, Some("X")),
            MonitorView::Error("X".into())
        );
        assert_eq!(
            MonitorView::resolve(Some(&snapshot), true, Some("")),
            MonitorView::Ready { updating: true }
        );
        assert_eq!(
            MonitorView::resolve(Some(&snapshot), false, None),
            MonitorView::Ready { updating: false }
        );
    }

    #[test]
    fn test_shortcuts_follow_status() {
        let shortcuts = build_shortcuts(AvailableActions::all(), Some(JobStatus::Paused));
        let find = |action| {
            shortcuts
                .iter()
                .find(|s| s.action == Some(action))
                .map(|s| s.disabled)
        };
        assert_eq!(find(MonitorAction::Resume), Some(false));
        assert_eq!(find(MonitorAction::Pause), Some(true));
        assert_eq!(find(MonitorAction::Cancel), Some(false));
        assert_eq!(find(MonitorAction::Refresh), Some(false));
        assert_eq!(find(MonitorAction::Quit), Some(false));
    }

    #[test]
    fn test_refresh_always_present() {
        let shortcuts = build_shortcuts(AvailableActions::none(), None);
        let actions: Vec<_> = shortcuts.iter().filter_map(|s| s.action).collect();
        assert_eq!(actions, vec![MonitorAction::Refresh, MonitorAction::Quit]);
    }

    #[test]
    fn test_invoke_forwards_job_id() {
        let calls = RefCell::new(Vec::new());
        let mut callbacks = MonitorCallbacks::new()
            .on_pause(|id: &str| {
                calls.borrow_mut().push(format!("pause {id}"));
                Ok(())
            })
            .on_cancel(|id: &str| {
                calls.borrow_mut().push(format!("cancel {id}"));
                Ok(())
            });

        assert_eq!(
            callbacks.available(),
            AvailableActions {
                pause: true,
                resume: false,
                cancel: true
            }
        );
        assert!(callbacks.invoke(MonitorAction::Pause, "ft-9").unwrap());
        assert!(!callbacks.invoke(MonitorAction::Resume, "ft-9").unwrap());
        assert!(!callbacks.invoke(MonitorAction::Refresh, "ft-9").unwrap());
        assert!(callbacks.invoke(MonitorAction::Cancel, "ft-9").unwrap());
        drop(callbacks);
        assert_eq!(calls.into_inner(), vec!["pause ft-9", "cancel ft-9"]);
    }

    #[test]
    fn test_loading_screen_has_no_panels() {
        let config = MonitorConfig::default();
        let props = MonitorProps {
            loading: true,
            ..Default::default()
        };
        let text = render(TerminalMonitor::new(props, &config), 80, 20);
        assert!(text.contains("Loading job metrics..."));
        assert!(!text.contains("PROGRESS"));
        assert!(text.contains("[F5] Refresh"));
    }

    #[test]
    fn test_error_screen_wins_over_data() {
        let config = MonitorConfig::default();
        let snapshot = running();
        let props = MonitorProps {
            metrics: Some(&snapshot),
            error: Some("connection refused"),
            ..Default::default()
        };
        let text = render(TerminalMonitor::new(props, &config), 80, 20);
        assert!(text.contains("connection refused"));
        assert!(!text.contains("JOB MONITOR"));
    }

    #[test]
    fn test_ready_screen_with_banner_and_updating() {
        let config = MonitorConfig::default();
        let snapshot = MetricsSnapshot {
            warning: Some("No update for 12 minutes".into()),
            ..running()
        };
        let props = MonitorProps {
            metrics: Some(&snapshot),
            loading: true,
            available: AvailableActions::all(),
            ..Default::default()
        };
        let text = render(TerminalMonitor::new(props, &config), 100, 40);
        let first = text.lines().next().unwrap_or_default();
        assert!(first.contains("No update for 12 minutes"));
        assert!(first.contains("updating"));
        for title in [
            "JOB MONITOR",
            "PROGRESS",
            "METRICS",
            "GPU",
            "PERFORMANCE",
            "CHECKPOINT",
        ] {
            assert!(text.contains(title), "missing {title}");
        }
    }
}
