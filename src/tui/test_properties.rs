//! Property-based tests for dashboard reducer invariants.
//!
//! Arbitrary interleavings of keys, stream events, and timers must keep the
//! queue collection untouched by view changes and the scroll offset inside
//! the queue area. Reconnect attempts stay within the cap, and only the newest
//! search input is ever committed.

use std::time::Duration;

use chrono::{Local, TimeZone};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proptest::prelude::*;

use super::model::{DashboardModel, DashboardMsg, DashboardTiming};
use super::render::viewport;
use super::update::update;
use crate::queue::types::Queue;
use crate::stream::connection::ReconnectPolicy;
use crate::stream::transport::StreamEvent;

// ──────────────────── strategies ────────────────────

fn arb_view_key() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        Just(KeyCode::Char('v')),
        Just(KeyCode::Char('g')),
        Just(KeyCode::Char('l')),
        Just(KeyCode::Char('f')),
        Just(KeyCode::Char('s')),
        Just(KeyCode::Char('/')),
        Just(KeyCode::Char('a')),
        Just(KeyCode::Char('_')),
        Just(KeyCode::Backspace),
        Just(KeyCode::Esc),
        Just(KeyCode::Enter),
        Just(KeyCode::PageDown),
        Just(KeyCode::PageUp),
        Just(KeyCode::End),
        Just(KeyCode::Home),
    ]
}

#[derive(Debug, Clone)]
enum LinkEvent {
    Connect,
    Open,
    Close,
    Online,
}

fn arb_link_event() -> impl Strategy<Value = LinkEvent> {
    prop_oneof![
        Just(LinkEvent::Connect),
        Just(LinkEvent::Open),
        Just(LinkEvent::Close),
        Just(LinkEvent::Online),
    ]
}

fn model() -> DashboardModel {
    let mut m = DashboardModel::new(ReconnectPolicy::default(), DashboardTiming::default(), (120, 40));
    m.queues = vec![
        Queue {
            name: "wan_OUT".to_string(),
            rate: "10Mbps".to_string(),
            utilization: 91.0,
            ..Queue::default()
        },
        Queue {
            name: "wan_IN".to_string(),
            rate: "1Gbps".to_string(),
            utilization: 12.0,
            ..Queue::default()
        },
    ];
    m
}

fn at() -> chrono::DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .expect("valid local time")
}

proptest! {
    #[test]
    fn view_keys_never_mutate_collection(keys in proptest::collection::vec(arb_view_key(), 0..64)) {
        let mut m = model();
        let before = m.queues.clone();
        for code in keys {
            let _ = update(&mut m, DashboardMsg::Key(KeyEvent::new(code, KeyModifiers::NONE)));
        }
        prop_assert_eq!(&m.queues, &before);
        prop_assert!(m.visible_queues().len() <= before.len());
        prop_assert!(m.scroll <= viewport(&m).max_offset());
    }

    #[test]
    fn reconnect_attempts_stay_within_cap(events in proptest::collection::vec(arb_link_event(), 0..64)) {
        let mut m = model();
        for event in events {
            let generation = m.connection.generation();
            let msg = match event {
                LinkEvent::Connect => DashboardMsg::ReconnectDue { attempt: m.connection.attempts() },
                LinkEvent::Open => DashboardMsg::Stream { event: StreamEvent::Opened { generation }, at: at() },
                LinkEvent::Close => DashboardMsg::Stream {
                    event: StreamEvent::Closed { generation, reason: String::new() },
                    at: at(),
                },
                LinkEvent::Online => DashboardMsg::Network(crate::stream::network::NetworkSignal::Online),
            };
            let _ = update(&mut m, msg);
            prop_assert!(m.connection.attempts() <= m.connection.policy().max_attempts);
        }
    }

    #[test]
    fn only_latest_search_revision_commits(text in "[a-z]{1,12}", stale in 0_u64..12) {
        let mut m = model();
        let _ = update(&mut m, DashboardMsg::Key(KeyEvent::new(KeyCode::Char('/'), KeyModifiers::NONE)));
        for c in text.chars() {
            let _ = update(&mut m, DashboardMsg::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
        }
        let latest = m.search.revision;
        if stale < latest {
            let _ = update(&mut m, DashboardMsg::SearchDebounced { revision: stale });
            prop_assert_eq!(m.search.committed.as_str(), "");
        }
        let _ = update(&mut m, DashboardMsg::SearchDebounced { revision: latest });
        prop_assert_eq!(m.search.committed.as_str(), text.as_str());
        prop_assert_eq!(m.timing.search_debounce, Duration::from_millis(300));
    }
}
