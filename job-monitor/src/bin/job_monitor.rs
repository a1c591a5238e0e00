//! Job monitor TUI binary.
//!
//! Usage:
//!   job-monitor --status-file <path> [--control-file <path>]
//!   job-monitor --demo
//!
//! Hotkeys:
//!   p/r/c - Pause, resume, cancel (when a control file is given)
//!   F5 - Reload
//!   j/k or arrows - Scroll logs
//!   q - Quit

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use job_monitor::{
    capture_monitor, control_callbacks, init_logging, App, CaptureFormat, DemoSource,
    FileControlSink, FileSource, MonitorCallbacks, MonitorConfig, MonitorProps, MonitorState,
    PollSettings, SnapshotSource, SourceFactory,
};

#[derive(Parser)]
#[command(name = "job-monitor")]
#[command(about = "Terminal monitor for fine-tuning jobs")]
struct Args {
    /// JSON status file kept up to date by the training backend
    #[arg(short, long, conflicts_with = "demo")]
    status_file: Option<PathBuf>,

    /// Watch a synthetic job instead of a status file
    #[arg(long)]
    demo: bool,

    /// File that pause/resume/cancel requests are appended to
    #[arg(long)]
    control_file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Poll interval in milliseconds
    #[arg(long)]
    refresh_ms: Option<u64>,

    /// Number of log lines shown
    #[arg(long)]
    max_log_lines: Option<usize>,

    /// Draw panels without borders
    #[arg(long)]
    no_frame: bool,

    /// Use double-line borders
    #[arg(long)]
    double_borders: bool,

    /// Compact shortcut legend
    #[arg(long)]
    compact: bool,

    /// Write logs to this file (logs are discarded otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print a single frame to stdout and exit
    #[arg(long)]
    once: bool,

    /// Keep colors in --once output
    #[arg(long, requires = "once")]
    ansi: bool,

    /// Frame width for --once
    #[arg(long, default_value_t = 120)]
    width: u16,

    /// Frame height for --once
    #[arg(long, default_value_t = 40)]
    height: u16,
}

impl Args {
    fn config(&self) -> anyhow::Result<MonitorConfig> {
        let mut config = match &self.config {
            Some(path) => MonitorConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => MonitorConfig::default(),
        };

        if let Some(refresh_ms) = self.refresh_ms {
            config.refresh_ms = refresh_ms;
        }
        if let Some(max_log_lines) = self.max_log_lines {
            config.max_log_lines = max_log_lines;
            config.log_buffer_limit = config.log_buffer_limit.max(max_log_lines);
        }
        if self.no_frame {
            config.framed_panels = false;
        }
        if self.double_borders {
            config.double_borders = true;
        }
        if self.compact {
            config.compact_shortcuts = true;
        }

        config.validate()?;
        Ok(config)
    }

    fn source_factory(&self) -> anyhow::Result<SourceFactory> {
        if self.demo {
            return Ok(Box::new(|| {
                Ok(Box::new(DemoSource::default()) as Box<dyn SnapshotSource>)
            }));
        }
        match &self.status_file {
            Some(path) => {
                let path = path.clone();
                Ok(Box::new(move || {
                    Ok(Box::new(FileSource::new(path.clone())) as Box<dyn SnapshotSource>)
                }))
            }
            None => bail!("either --status-file or --demo is required"),
        }
    }

    fn callbacks(&self) -> MonitorCallbacks<'static> {
        match &self.control_file {
            Some(path) => {
                let sink = FileControlSink::new(path.clone());
                control_callbacks(Rc::new(RefCell::new(sink)))
            }
            None => MonitorCallbacks::new(),
        }
    }
}

/// Fetch once and print the resulting frame.
fn print_once(args: &Args, config: &MonitorConfig, factory: &SourceFactory) -> anyhow::Result<()> {
    let mut source = factory()?;
    let fetched = source.fetch().map(|mut snapshot| {
        PollSettings::from_config(config).prepare(&mut snapshot);
        snapshot
    });

    let error = fetched.as_ref().err().map(ToString::to_string);
    let props = MonitorProps {
        metrics: fetched.as_ref().ok(),
        loading: false,
        error: error.as_deref(),
        available: args.callbacks().available(),
    };
    let format = if args.ansi {
        CaptureFormat::Ansi
    } else {
        CaptureFormat::Plain
    };

    let frame = capture_monitor(
        props,
        config,
        &mut MonitorState::default(),
        args.width,
        args.height,
        format,
    )?;
    io::stdout().lock().write_all(frame.as_bytes())?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), "info")?;

    let config = args.config()?;
    let factory = args.source_factory()?;

    if args.once {
        return print_once(&args, &config, &factory);
    }

    info!(refresh_ms = config.refresh_ms, "Starting job monitor");
    let mut app = App::new(config, factory, args.callbacks());
    app.run()?;

    Ok(())
}
