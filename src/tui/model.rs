//! Elm-style state model for the queue dashboard.
//!
//! All display state lives in [`DashboardModel`]. Input, network, and timer
//! events arrive as [`DashboardMsg`] values; side-effects are represented as
//! [`DashboardCmd`] values returned from the update function.
//!
//! The model performs no I/O. Wall-clock time enters only through message
//! payloads so every transition is reproducible in tests.

#![allow(missing_docs)]

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::KeyEvent;

use crate::core::config::Config;
use crate::core::errors::QmError;
use crate::queue::types::{Queue, QueueSnapshot, SystemStats};
use crate::queue::view::{Filter, SortKey, ViewMode, project};
use crate::stream::connection::{ConnectionManager, ReconnectPolicy};
use crate::stream::network::NetworkSignal;
use crate::stream::transport::StreamEvent;
use crate::tui::notifications::NotificationCenter;

// ──────────────────── timing ────────────────────

/// Timer lengths the update function hands to the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardTiming {
    pub search_debounce: Duration,
    pub splash: Duration,
    pub notification_display: Duration,
    pub notification_exit: Duration,
}

impl Default for DashboardTiming {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(300),
            splash: Duration::from_millis(2_000),
            notification_display: Duration::from_millis(5_000),
            notification_exit: Duration::from_millis(300),
        }
    }
}

impl DashboardTiming {
    #[must_use]
    pub const fn from_config(cfg: &Config) -> Self {
        Self {
            search_debounce: Duration::from_millis(cfg.dashboard.search_debounce_ms),
            splash: Duration::from_millis(cfg.dashboard.splash_ms),
            notification_display: Duration::from_millis(cfg.notifications.display_ms),
            notification_exit: Duration::from_millis(cfg.notifications.exit_ms),
        }
    }
}

// ──────────────────── search ────────────────────

/// Search box state: what the user typed vs. what the projection uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Keys go into `input` while focused.
    pub focused: bool,
    pub input: String,
    /// Term applied to the projection after the debounce window.
    pub committed: String,
    /// Bumped on every edit; only the latest revision may commit.
    pub revision: u64,
}

// ──────────────────── model ────────────────────

/// Complete client view state.
#[derive(Debug, Clone)]
pub struct DashboardModel {
    pub queues: Vec<Queue>,
    pub stats: SystemStats,
    pub connection: ConnectionManager,
    pub view: ViewMode,
    pub filter: Filter,
    pub sort: SortKey,
    pub search: SearchState,
    pub last_update: Option<DateTime<Local>>,
    pub notifications: NotificationCenter,
    /// Startup splash is showing.
    pub splash: bool,
    pub quit: bool,
    pub terminal_size: (u16, u16),
    /// First queue-area row on screen. Clamped after every update.
    pub scroll: usize,
    pub timing: DashboardTiming,
}

impl DashboardModel {
    #[must_use]
    pub fn new(policy: ReconnectPolicy, timing: DashboardTiming, terminal_size: (u16, u16)) -> Self {
        Self {
            queues: Vec::new(),
            stats: SystemStats::default(),
            connection: ConnectionManager::new(policy),
            view: ViewMode::default(),
            filter: Filter::default(),
            sort: SortKey::default(),
            search: SearchState::default(),
            last_update: None,
            notifications: NotificationCenter::new(),
            splash: true,
            quit: false,
            terminal_size,
            scroll: 0,
            timing,
        }
    }

    /// Build from loaded configuration, applying the configured initial view.
    #[must_use]
    pub fn from_config(cfg: &Config, terminal_size: (u16, u16)) -> Self {
        let mut model = Self::new(
            ReconnectPolicy::from_config(&cfg.stream),
            DashboardTiming::from_config(cfg),
            terminal_size,
        );
        model.view = cfg.dashboard.view;
        model.filter = cfg.dashboard.filter;
        model.sort = cfg.dashboard.sort;
        model
    }

    /// Replace the whole collection and stats. Streamed and fetched data
    /// take the same path.
    pub fn apply_snapshot(&mut self, snapshot: QueueSnapshot, at: DateTime<Local>) {
        self.queues = snapshot.queues;
        self.stats = snapshot.system_stats;
        self.last_update = Some(at);
    }

    /// Current projection under the active filter, search, and sort.
    #[must_use]
    pub fn visible_queues(&self) -> Vec<Queue> {
        project(&self.queues, self.filter, &self.search.committed, self.sort)
    }
}

// ──────────────────── messages ────────────────────

/// Events processed by the update function, in arrival order.
#[derive(Debug)]
pub enum DashboardMsg {
    Key(KeyEvent),
    Resize { cols: u16, rows: u16 },
    /// Terminal regained focus; treated like a page becoming visible.
    FocusGained,
    SplashElapsed,
    /// Socket lifecycle event, stamped with its receive time.
    Stream { event: StreamEvent, at: DateTime<Local> },
    /// A scheduled reconnect attempt is due.
    ReconnectDue { attempt: u32 },
    Network(NetworkSignal),
    SnapshotLoaded {
        result: Result<Option<QueueSnapshot>, QmError>,
        at: DateTime<Local>,
    },
    SearchDebounced { revision: u64 },
    NotificationExpired(u64),
    NotificationRemoved(u64),
    ExportFinished(Result<PathBuf, QmError>),
}

// ──────────────────── commands ────────────────────

/// Side-effects returned by the update function for the runtime to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCmd {
    None,
    Batch(Vec<Self>),
    Quit,
    /// Abort any live socket task and open a new one tagged `generation`.
    Connect { generation: u64 },
    ScheduleReconnect { attempt: u32, after: Duration },
    LoadSnapshot,
    ScheduleSearchCommit { revision: u64, after: Duration },
    ScheduleSplashEnd(Duration),
    ScheduleNotificationExit { id: u64, after: Duration },
    ScheduleNotificationRemoval { id: u64, after: Duration },
    /// Write an export document for this collection.
    Export { queues: Vec<Queue>, stats: SystemStats },
}

impl DashboardCmd {
    /// Flatten nested batches into a list of leaf commands.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(cmds) => cmds.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}
