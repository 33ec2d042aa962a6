//! Dashboard event loop and effect executor.
//!
//! One current-thread tokio runtime drives everything. Terminal input, the
//! socket task, snapshot fetches, timers, and the reachability probe all
//! feed [`DashboardMsg`] values into a single channel; the loop applies each
//! through [`update`], executes the returned commands, and repaints.

#![allow(missing_docs)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;

use crate::core::config::Config;
use crate::core::errors::{QmError, Result};
use crate::queue::export::ExportDocument;
use crate::stream::endpoints::Endpoints;
use crate::stream::network::{probe_target, spawn_probe};
use crate::stream::snapshot::SnapshotLoader;
use crate::stream::transport::spawn_stream;
use crate::tui::model::{DashboardCmd, DashboardModel, DashboardMsg};
use crate::tui::render::{paint, render};
use crate::tui::terminal_guard::TerminalGuard;
use crate::tui::theme::{ColorMode, Theme};
use crate::tui::update::{init, update};

/// Executes [`DashboardCmd`] values by spawning tasks that report back as
/// messages.
pub struct CommandExecutor {
    tx: UnboundedSender<DashboardMsg>,
    endpoints: Endpoints,
    loader: SnapshotLoader,
    export_dir: PathBuf,
    stream_task: Option<JoinHandle<()>>,
}

impl CommandExecutor {
    pub fn new(
        tx: UnboundedSender<DashboardMsg>,
        endpoints: Endpoints,
        loader: SnapshotLoader,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            tx,
            endpoints,
            loader,
            export_dir,
            stream_task: None,
        }
    }

    /// Run every command in `cmd`. Returns `true` when the loop should stop.
    pub fn execute(&mut self, cmd: DashboardCmd) -> bool {
        let mut quit = false;
        for leaf in cmd.flatten() {
            match leaf {
                DashboardCmd::None | DashboardCmd::Batch(_) => {}
                DashboardCmd::Quit => quit = true,
                DashboardCmd::Connect { generation } => self.connect(generation),
                DashboardCmd::ScheduleReconnect { attempt, after } => {
                    self.send_after(after, DashboardMsg::ReconnectDue { attempt });
                }
                DashboardCmd::LoadSnapshot => self.load_snapshot(),
                DashboardCmd::ScheduleSearchCommit { revision, after } => {
                    self.send_after(after, DashboardMsg::SearchDebounced { revision });
                }
                DashboardCmd::ScheduleSplashEnd(after) => {
                    self.send_after(after, DashboardMsg::SplashElapsed);
                }
                DashboardCmd::ScheduleNotificationExit { id, after } => {
                    self.send_after(after, DashboardMsg::NotificationExpired(id));
                }
                DashboardCmd::ScheduleNotificationRemoval { id, after } => {
                    self.send_after(after, DashboardMsg::NotificationRemoved(id));
                }
                DashboardCmd::Export { queues, stats } => {
                    let result = ExportDocument::build(&queues, &stats, Local::now())
                        .and_then(|doc| doc.write_to(&self.export_dir));
                    let _ = self.tx.send(DashboardMsg::ExportFinished(result));
                }
            }
        }
        quit
    }

    fn connect(&mut self, generation: u64) {
        if let Some(previous) = self.stream_task.take() {
            previous.abort();
        }
        self.stream_task = Some(spawn_stream(
            self.endpoints.stream_url.clone(),
            generation,
            self.tx.clone(),
            |event| DashboardMsg::Stream {
                event,
                at: Local::now(),
            },
        ));
    }

    fn load_snapshot(&self) {
        let loader = self.loader.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = loader.load().await;
            let _ = tx.send(DashboardMsg::SnapshotLoaded {
                result,
                at: Local::now(),
            });
        });
    }

    fn send_after(&self, after: Duration, msg: DashboardMsg) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(msg);
        });
    }

    pub fn shutdown(&mut self) {
        if let Some(task) = self.stream_task.take() {
            task.abort();
        }
    }
}

fn spawn_input(tx: UnboundedSender<DashboardMsg>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(event) = events.next().await {
            let msg = match event {
                Ok(Event::Key(key)) => DashboardMsg::Key(key),
                Ok(Event::Resize(cols, rows)) => DashboardMsg::Resize { cols, rows },
                Ok(Event::FocusGained) => DashboardMsg::FocusGained,
                Ok(_) => continue,
                Err(error) => {
                    tracing::warn!(%error, "terminal input failed");
                    break;
                }
            };
            if tx.send(msg).is_err() {
                break;
            }
        }
    })
}

/// Paint the current frame. A failed write is logged and the loop keeps
/// running; the next message repaints the whole screen.
fn repaint<W: Write>(out: &mut W, model: &DashboardModel, theme: Theme) -> bool {
    match paint(out, &render(model), theme, model.terminal_size) {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(%error, "repaint failed");
            false
        }
    }
}

/// Run the dashboard until the user quits.
pub fn run_dashboard(config: &Config, color: ColorMode) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| QmError::Runtime {
            details: format!("tokio runtime: {error}"),
        })?;
    runtime.block_on(run_loop(config, color))
}

async fn run_loop(config: &Config, color: ColorMode) -> Result<()> {
    let endpoints = Endpoints::from_base_url(&config.server.base_url)?;
    let loader = SnapshotLoader::new(endpoints.snapshot_url.clone(), config.server.request_timeout())?;
    tracing::info!(
        stream = %endpoints.stream_url,
        snapshot = %endpoints.snapshot_url,
        "dashboard starting"
    );

    let guard = TerminalGuard::new().map_err(|error| QmError::Runtime {
        details: format!("terminal setup: {error}"),
    })?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let input = spawn_input(tx.clone());
    let probe = probe_target(&config.server.base_url).map(|target| {
        spawn_probe(
            target,
            config.stream.probe_interval(),
            tx.clone(),
            DashboardMsg::Network,
        )
    });

    let mut executor = CommandExecutor::new(
        tx,
        endpoints,
        loader,
        config.export.directory.clone(),
    );
    let mut model = DashboardModel::from_config(config, TerminalGuard::terminal_size());
    let theme = Theme::new(color);

    let mut stdout = io::stdout();
    let mut quit = executor.execute(init(&mut model));
    repaint(&mut stdout, &model, theme);

    while !quit {
        let Some(msg) = rx.recv().await else {
            break;
        };
        quit = executor.execute(update(&mut model, msg)) || model.quit;
        if !quit {
            repaint(&mut stdout, &model, theme);
        }
    }

    executor.shutdown();
    input.abort();
    if let Some(probe) = probe {
        probe.abort();
    }
    drop(guard);
    tracing::info!("dashboard stopped");
    Ok(())
}
