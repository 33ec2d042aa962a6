//! Wire types produced by the monitoring service.
//!
//! Every field is defaulted: the backend omits fields freely (a bare
//! `{"total_queues": 1}` is a valid `system_stats`), and a missing or `null`
//! `queues` array in a streamed update means "no queues".

#![allow(missing_docs)]

use serde::{Deserialize, Deserializer, Serialize};

/// One queue-tree entry as reported by the router.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Queue {
    pub name: String,
    /// Raw rate expression, e.g. `"10Mbps"`, `"512k"`, `"0 bps"`.
    pub rate: String,
    pub max_limit: String,
    pub bytes: u64,
    /// Percentage of `max_limit`; may exceed 100.
    pub utilization: f64,
    pub packets: u64,
    pub limit_at: String,
    pub status: String,
}

/// Aggregate counters computed by the service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStats {
    pub total_queues: u32,
    pub total_upload: String,
    pub total_download: String,
    pub high_utilization: u32,
    pub average_utilization: f64,
}

/// Full point-in-time payload: the unit of wholesale replacement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSnapshot {
    /// The service marshals an empty router table as `null`.
    #[serde(deserialize_with = "null_as_default")]
    pub queues: Vec<Queue>,
    #[serde(deserialize_with = "null_as_default")]
    pub system_stats: SystemStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Frames pushed over the streaming channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    QueueUpdate {
        #[serde(default, deserialize_with = "null_as_default")]
        data: QueueSnapshot,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    /// Any other tag (`pong`, future additions). Ignored by the client.
    #[serde(other)]
    Unknown,
}

/// Response body of `GET /api/queue-stats`.
///
/// `queues` stays optional so an error body (`{"error": ...}`) that slipped
/// through with a 2xx status is distinguishable from an empty collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotBody {
    pub queues: Option<Vec<Queue>>,
    #[serde(default)]
    pub system_stats: Option<SystemStats>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl SnapshotBody {
    /// Convert into a snapshot when the body carries a queue collection.
    #[must_use]
    pub fn into_snapshot(self) -> Option<QueueSnapshot> {
        let queues = self.queues?;
        Some(QueueSnapshot {
            queues,
            system_stats: self.system_stats.unwrap_or_default(),
            timestamp: self.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_update_parses_with_partial_stats() {
        let raw = r#"{"type":"queue_update","data":{"queues":[{"name":"Q1_OUT","rate":"10Mbps","max_limit":"100Mbps","bytes":1048576,"utilization":85}],"system_stats":{"total_queues":1}}}"#;
        let msg: StreamMessage = serde_json::from_str(raw).expect("valid frame");
        let StreamMessage::QueueUpdate { data } = msg else {
            panic!("expected queue_update");
        };
        assert_eq!(data.queues.len(), 1);
        assert_eq!(data.queues[0].name, "Q1_OUT");
        assert!((data.queues[0].utilization - 85.0).abs() < f64::EPSILON);
        assert_eq!(data.system_stats.total_queues, 1);
        assert!(data.system_stats.total_upload.is_empty());
    }

    #[test]
    fn queue_update_without_data_yields_empty_collection() {
        let msg: StreamMessage =
            serde_json::from_str(r#"{"type":"queue_update"}"#).expect("valid frame");
        assert_eq!(
            msg,
            StreamMessage::QueueUpdate {
                data: QueueSnapshot::default()
            }
        );
    }

    #[test]
    fn null_queues_and_stats_mean_empty() {
        let msg: StreamMessage = serde_json::from_str(
            r#"{"type":"queue_update","data":{"queues":null,"system_stats":null}}"#,
        )
        .expect("valid frame");
        assert_eq!(
            msg,
            StreamMessage::QueueUpdate {
                data: QueueSnapshot::default()
            }
        );

        let msg: StreamMessage =
            serde_json::from_str(r#"{"type":"queue_update","data":null}"#).expect("valid frame");
        assert_eq!(
            msg,
            StreamMessage::QueueUpdate {
                data: QueueSnapshot::default()
            }
        );
    }

    #[test]
    fn snapshot_body_with_null_queues_is_not_applied() {
        let body: SnapshotBody =
            serde_json::from_str(r#"{"queues":null,"system_stats":null}"#).expect("parses");
        assert!(body.into_snapshot().is_none());
    }

    #[test]
    fn error_frame_parses() {
        let msg: StreamMessage =
            serde_json::from_str(r#"{"type":"error","message":"连接断开","timestamp":1}"#)
                .expect("valid frame");
        assert_eq!(
            msg,
            StreamMessage::Error {
                message: "连接断开".to_string()
            }
        );
    }

    #[test]
    fn unknown_tag_is_tolerated() {
        let msg: StreamMessage =
            serde_json::from_str(r#"{"type":"pong","timestamp":1700000000}"#).expect("parses");
        assert_eq!(msg, StreamMessage::Unknown);
    }

    #[test]
    fn untagged_frame_is_rejected() {
        assert!(serde_json::from_str::<StreamMessage>(r#"{"queues":[]}"#).is_err());
    }

    #[test]
    fn snapshot_body_without_queues_is_not_applied() {
        let body: SnapshotBody =
            serde_json::from_str(r#"{"error":"获取队列统计失败","detail":"timeout"}"#)
                .expect("parses");
        assert!(body.into_snapshot().is_none());
    }

    #[test]
    fn snapshot_body_with_queues_converts() {
        let body: SnapshotBody = serde_json::from_str(
            r#"{"queues":[],"system_stats":{"total_upload":"1.0 Mbps"},"timestamp":42}"#,
        )
        .expect("parses");
        let snap = body.into_snapshot().expect("has queues");
        assert!(snap.queues.is_empty());
        assert_eq!(snap.system_stats.total_upload, "1.0 Mbps");
        assert_eq!(snap.timestamp, Some(42));
    }
}
