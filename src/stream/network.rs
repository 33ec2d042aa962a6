//! Online/offline signals from a periodic reachability probe.
//!
//! A TCP connect to the service origin stands in for the host's network
//! status. Only transitions are reported.

#![allow(missing_docs)]

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkSignal {
    Online,
    Offline,
}

/// Edge detector over raw probe results. Starts out assuming online.
#[derive(Debug, Clone, Copy)]
pub struct NetworkWatch {
    online: bool,
}

impl Default for NetworkWatch {
    fn default() -> Self {
        Self { online: true }
    }
}

impl NetworkWatch {
    /// Record one probe result; returns a signal on a state change.
    pub fn observe(&mut self, reachable: bool) -> Option<NetworkSignal> {
        if reachable == self.online {
            return None;
        }
        self.online = reachable;
        Some(if reachable {
            NetworkSignal::Online
        } else {
            NetworkSignal::Offline
        })
    }
}

/// `host:port` to probe for a `http(s)://host[:port][/path]` base URL.
#[must_use]
pub fn probe_target(base_url: &str) -> Option<String> {
    let (rest, default_port) = if let Some(rest) = base_url.strip_prefix("https://") {
        (rest, 443)
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        (rest, 80)
    } else {
        return None;
    };
    let authority = rest.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return None;
    }
    let has_port = match authority.rsplit_once(':') {
        // A bracketed IPv6 literal without a port ends in `]`.
        Some((_, port)) => !port.ends_with(']') && port.parse::<u16>().is_ok(),
        None => false,
    };
    if has_port {
        Some(authority.to_string())
    } else {
        Some(format!("{authority}:{default_port}"))
    }
}

/// One reachability check.
pub async fn probe(target: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(target)).await,
        Ok(Ok(_))
    )
}

/// Spawn the periodic probe; transitions are sent through `wrap`.
pub fn spawn_probe<M, F>(
    target: String,
    interval: Duration,
    tx: UnboundedSender<M>,
    wrap: F,
) -> JoinHandle<()>
where
    M: Send + 'static,
    F: Fn(NetworkSignal) -> M + Send + 'static,
{
    tokio::spawn(async move {
        let mut watch = NetworkWatch::default();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let reachable = probe(&target, interval).await;
            if let Some(signal) = watch.observe(reachable) {
                tracing::info!(?signal, %target, "network reachability changed");
                if tx.send(wrap(signal)).is_err() {
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_reports_only_transitions() {
        let mut watch = NetworkWatch::default();
        assert_eq!(watch.observe(true), None);
        assert_eq!(watch.observe(false), Some(NetworkSignal::Offline));
        assert_eq!(watch.observe(false), None);
        assert_eq!(watch.observe(true), Some(NetworkSignal::Online));
        assert_eq!(watch.observe(true), None);
    }

    #[test]
    fn probe_target_defaults_ports() {
        assert_eq!(
            probe_target("http://10.0.0.1:5000").as_deref(),
            Some("10.0.0.1:5000")
        );
        assert_eq!(probe_target("http://monitor.lan").as_deref(), Some("monitor.lan:80"));
        assert_eq!(
            probe_target("https://monitor.lan/base").as_deref(),
            Some("monitor.lan:443")
        );
        assert_eq!(probe_target("http://[::1]").as_deref(), Some("[::1]:80"));
        assert_eq!(probe_target("http://[::1]:8080").as_deref(), Some("[::1]:8080"));
        assert_eq!(probe_target("ftp://x"), None);
        assert_eq!(probe_target("http://"), None);
    }

    #[tokio::test]
    async fn probe_detects_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr").to_string();
        assert!(probe(&addr, Duration::from_secs(1)).await);
        drop(listener);
    }
}
