use std::fmt;

/// Something the operator can ask the monitor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorAction {
    Pause,
    Resume,
    Cancel,
    /// Tear down the poller and start over from an empty screen
    Refresh,
    Quit,
    ScrollLogsUp,
    ScrollLogsDown,
}

impl MonitorAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pause => "Pause",
            Self::Resume => "Resume",
            Self::Cancel => "Cancel",
            Self::Refresh => "Refresh",
            Self::Quit => "Quit",
            Self::ScrollLogsUp => "Scroll up",
            Self::ScrollLogsDown => "Scroll down",
        }
    }
}

/// Which job-control callbacks the host supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvailableActions {
    pub pause: bool,
    pub resume: bool,
    pub cancel: bool,
}

impl AvailableActions {
    pub fn all() -> Self {
        Self {
            pause: true,
            resume: true,
            cancel: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl fmt::Display for MonitorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
