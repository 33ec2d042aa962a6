//! Pure update function for the Elm-style dashboard.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effects the runtime should execute.
//! This module performs no I/O; all effects are [`DashboardCmd`] values.

use crate::queue::types::QueueSnapshot;
use crate::stream::connection::{ConnectionState, FrameOutcome, decode_frame};
use crate::stream::network::NetworkSignal;
use crate::stream::transport::StreamEvent;
use crate::tui::input::{InputAction, ScrollStep, resolve_key_event};
use crate::tui::model::{DashboardCmd, DashboardModel, DashboardMsg};
use crate::tui::notifications::Severity;
use crate::tui::render::viewport;

use chrono::{DateTime, Local};

/// Commands to run once at startup: splash timer, stream connect, snapshot.
pub fn init(model: &mut DashboardModel) -> DashboardCmd {
    let generation = model.connection.on_connect_requested();
    DashboardCmd::Batch(vec![
        DashboardCmd::ScheduleSplashEnd(model.timing.splash),
        DashboardCmd::Connect { generation },
        DashboardCmd::LoadSnapshot,
    ])
}

/// Apply a message to the model and return the next command for the runtime.
pub fn update(model: &mut DashboardModel, msg: DashboardMsg) -> DashboardCmd {
    let cmd = dispatch(model, msg);
    // The projection or terminal may have shrunk under the offset.
    model.scroll = model.scroll.min(viewport(model).max_offset());
    cmd
}

fn dispatch(model: &mut DashboardModel, msg: DashboardMsg) -> DashboardCmd {
    match msg {
        DashboardMsg::Key(key) => resolve_key_event(&key, model.search.focused)
            .map_or(DashboardCmd::None, |action| apply_input_action(model, action)),

        DashboardMsg::Resize { cols, rows } => {
            model.terminal_size = (cols, rows);
            DashboardCmd::None
        }

        DashboardMsg::FocusGained => {
            tracing::debug!("terminal focus regained, reloading snapshot");
            DashboardCmd::LoadSnapshot
        }

        DashboardMsg::SplashElapsed => {
            model.splash = false;
            DashboardCmd::None
        }

        DashboardMsg::Stream { event, at } => handle_stream_event(model, event, at),

        DashboardMsg::ReconnectDue { attempt } => {
            // A socket that is already up is left alone.
            if model.connection.state() == ConnectionState::Connected {
                tracing::debug!(attempt, "reconnect timer fired while connected");
                return DashboardCmd::None;
            }
            tracing::info!(
                attempt,
                max = model.connection.policy().max_attempts,
                "reconnect attempt"
            );
            let generation = model.connection.on_connect_requested();
            DashboardCmd::Connect { generation }
        }

        DashboardMsg::Network(NetworkSignal::Online) => {
            let generation = model.connection.on_connect_requested();
            DashboardCmd::Batch(vec![
                notify(
                    model,
                    "Network restored",
                    "Network connection is back",
                    Severity::Success,
                ),
                DashboardCmd::Connect { generation },
            ])
        }

        DashboardMsg::Network(NetworkSignal::Offline) => notify(
            model,
            "Network lost",
            "Network connection dropped",
            Severity::Warning,
        ),

        DashboardMsg::SnapshotLoaded { result, at } => match result {
            Ok(Some(snapshot)) => {
                apply(model, snapshot, at);
                DashboardCmd::None
            }
            Ok(None) => {
                tracing::debug!("snapshot body carried no queues; nothing applied");
                DashboardCmd::None
            }
            Err(error) => {
                tracing::warn!(code = error.code(), %error, "snapshot load failed");
                notify(
                    model,
                    "Data load failed",
                    error.user_message(),
                    Severity::Error,
                )
            }
        },

        DashboardMsg::SearchDebounced { revision } => {
            if revision == model.search.revision {
                model.search.committed.clone_from(&model.search.input);
            }
            DashboardCmd::None
        }

        DashboardMsg::NotificationExpired(id) => {
            if model.notifications.begin_exit(id) {
                DashboardCmd::ScheduleNotificationRemoval {
                    id,
                    after: model.timing.notification_exit,
                }
            } else {
                DashboardCmd::None
            }
        }

        DashboardMsg::NotificationRemoved(id) => {
            model.notifications.remove(id);
            DashboardCmd::None
        }

        DashboardMsg::ExportFinished(result) => match result {
            Ok(path) => {
                tracing::info!(path = %path.display(), "export written");
                notify(
                    model,
                    "Export complete",
                    format!("Queue data exported to {}", path.display()),
                    Severity::Success,
                )
            }
            Err(error) => {
                tracing::warn!(code = error.code(), %error, "export failed");
                notify(
                    model,
                    "Export failed",
                    "An error occurred while exporting data",
                    Severity::Error,
                )
            }
        },
    }
}

fn apply(model: &mut DashboardModel, snapshot: QueueSnapshot, at: DateTime<Local>) {
    tracing::debug!(queues = snapshot.queues.len(), "applying queue snapshot");
    model.apply_snapshot(snapshot, at);
}

fn notify(
    model: &mut DashboardModel,
    title: impl Into<String>,
    message: impl Into<String>,
    severity: Severity,
) -> DashboardCmd {
    let id = model.notifications.notify(title, message, severity);
    DashboardCmd::ScheduleNotificationExit {
        id,
        after: model.timing.notification_display,
    }
}

fn handle_stream_event(
    model: &mut DashboardModel,
    event: StreamEvent,
    at: DateTime<Local>,
) -> DashboardCmd {
    match event {
        StreamEvent::Opened { generation } => {
            if !model.connection.on_open(generation) {
                return DashboardCmd::None;
            }
            notify(
                model,
                "Connected",
                "Connected to the RouterOS monitoring service",
                Severity::Success,
            )
        }

        StreamEvent::Frame { generation, text } => {
            if !model.connection.is_current(generation) {
                return DashboardCmd::None;
            }
            match decode_frame(&text) {
                FrameOutcome::Update(snapshot) => {
                    apply(model, snapshot, at);
                    DashboardCmd::None
                }
                FrameOutcome::ServerError(message) => {
                    tracing::warn!(%message, "server reported error");
                    notify(model, "Server error", message, Severity::Error)
                }
                FrameOutcome::Ignored => DashboardCmd::None,
                FrameOutcome::Malformed(error) => {
                    tracing::warn!(%error, "dropping malformed stream frame");
                    DashboardCmd::None
                }
            }
        }

        StreamEvent::Closed { generation, reason } => {
            match model.connection.on_close(generation) {
                Some(plan) => {
                    tracing::info!(
                        %reason,
                        attempt = plan.attempt,
                        delay_ms = u64::try_from(plan.delay.as_millis()).unwrap_or(u64::MAX),
                        "stream closed, reconnect scheduled"
                    );
                    DashboardCmd::ScheduleReconnect {
                        attempt: plan.attempt,
                        after: plan.delay,
                    }
                }
                None => {
                    if model.connection.is_current(generation) {
                        tracing::warn!(%reason, "stream closed, reconnect attempts exhausted");
                    }
                    DashboardCmd::None
                }
            }
        }
    }
}

fn schedule_search_commit(model: &mut DashboardModel) -> DashboardCmd {
    model.search.revision += 1;
    DashboardCmd::ScheduleSearchCommit {
        revision: model.search.revision,
        after: model.timing.search_debounce,
    }
}

fn apply_input_action(model: &mut DashboardModel, action: InputAction) -> DashboardCmd {
    match action {
        InputAction::Quit => {
            model.quit = true;
            DashboardCmd::Quit
        }
        InputAction::Refresh => DashboardCmd::LoadSnapshot,
        InputAction::RefreshWithNotice => DashboardCmd::Batch(vec![
            DashboardCmd::LoadSnapshot,
            notify(model, "Refreshing", "Reloading queue data...", Severity::Info),
        ]),
        InputAction::FocusSearch => {
            model.search.focused = true;
            DashboardCmd::None
        }
        InputAction::LeaveSearch => {
            model.search.focused = false;
            DashboardCmd::None
        }
        InputAction::SearchInsert(c) => {
            model.search.input.push(c);
            schedule_search_commit(model)
        }
        InputAction::SearchBackspace => {
            if model.search.input.pop().is_some() {
                schedule_search_commit(model)
            } else {
                DashboardCmd::None
            }
        }
        InputAction::ToggleView => {
            model.view = model.view.toggle();
            DashboardCmd::None
        }
        InputAction::SetView(view) => {
            model.view = view;
            DashboardCmd::None
        }
        InputAction::CycleFilter => {
            model.filter = model.filter.cycle();
            DashboardCmd::None
        }
        InputAction::CycleSort => {
            model.sort = model.sort.cycle();
            DashboardCmd::None
        }
        InputAction::Export => {
            if model.queues.is_empty() {
                return notify(model, "Export failed", "No data to export", Severity::Warning);
            }
            DashboardCmd::Export {
                queues: model.queues.clone(),
                stats: model.stats.clone(),
            }
        }
        InputAction::Scroll(step) => {
            let page = viewport(model).height;
            model.scroll = match step {
                ScrollStep::LineUp => model.scroll.saturating_sub(1),
                ScrollStep::LineDown => model.scroll.saturating_add(1),
                ScrollStep::PageUp => model.scroll.saturating_sub(page),
                ScrollStep::PageDown => model.scroll.saturating_add(page),
                ScrollStep::Top => 0,
                ScrollStep::Bottom => usize::MAX,
            };
            DashboardCmd::None
        }
    }
}
