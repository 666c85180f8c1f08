//! Snapshot fan-out to observer channels.
//!
//! The tick loop owns the [`ObserverSet`]. Each channel is the sending half
//! of a bounded queue drained by that observer's writer task, so a slow or
//! dead observer never stalls a tick. Channels are only ever added.

use std::sync::Arc;

use ballpit_shared::protocol::{ServerMsg, SnapshotMsg};
use tokio::sync::mpsc;

use crate::ball::Ball;

/// Why a snapshot could not be queued for an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("observer queue is full")]
    QueueFull,
    #[error("observer connection is closed")]
    Closed,
}

/// Outbound channel to one observer.
pub struct ObserverChannel {
    pub id: u32,
    tx: mpsc::Sender<Arc<SnapshotMsg>>,
    failures: u64,
}

impl ObserverChannel {
    /// Create a channel and the receiver its writer task drains.
    pub fn new(id: u32, depth: usize) -> (Self, mpsc::Receiver<Arc<SnapshotMsg>>) {
        let (tx, rx) = mpsc::channel(depth.max(1));
        (
            Self {
                id,
                tx,
                failures: 0,
            },
            rx,
        )
    }

    fn deliver(&mut self, snapshot: &Arc<SnapshotMsg>) -> Result<(), TransportError> {
        self.tx.try_send(Arc::clone(snapshot)).map_err(|e| {
            self.failures += 1;
            match e {
                mpsc::error::TrySendError::Full(_) => TransportError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
            }
        })
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}

/// Result of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Grow-only set of observer channels.
#[derive(Default)]
pub struct ObserverSet {
    channels: Vec<ObserverChannel>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, channel: ObserverChannel) {
        tracing::debug!("Observer {} registered", channel.id);
        self.channels.push(channel);
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Queue the full ball collection on every channel. A failure on one
    /// channel is logged and does not affect the others; failed channels
    /// stay in the set.
    pub fn broadcast(&mut self, balls: &[Ball]) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        if self.channels.is_empty() {
            return report;
        }

        let snapshot = Arc::new(snapshot_from_balls(balls));
        for channel in &mut self.channels {
            match channel.deliver(&snapshot) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    if channel.failures == 1 {
                        tracing::warn!("Snapshot to observer {} failed: {}", channel.id, e);
                    } else {
                        tracing::trace!("Snapshot to observer {} failed: {}", channel.id, e);
                    }
                }
            }
        }
        report
    }
}

pub fn snapshot_from_balls(balls: &[Ball]) -> SnapshotMsg {
    SnapshotMsg {
        balls: balls.iter().map(Ball::to_wire).collect(),
    }
}

/// Serialize a snapshot frame for the wire.
pub fn encode_snapshot(snapshot: &SnapshotMsg) -> Result<String, serde_json::Error> {
    // ServerMsg owns its payload; clone the ball list into the envelope
    serde_json::to_string(&ServerMsg::Snapshot(snapshot.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balls() -> Vec<Ball> {
        vec![
            Ball::new(200, 200, 2, 2, 20, [10, 20, 30]).unwrap(),
            Ball::new(300, 250, -1, 4, 35, [40, 50, 60]).unwrap(),
        ]
    }

    #[test]
    fn broadcast_reaches_every_channel() {
        let mut set = ObserverSet::new();
        let mut receivers = Vec::new();
        for id in 0..3 {
            let (ch, rx) = ObserverChannel::new(id, 4);
            set.register(ch);
            receivers.push(rx);
        }

        let report = set.broadcast(&balls());
        assert_eq!(report, BroadcastReport { delivered: 3, failed: 0 });
        for rx in &mut receivers {
            let snapshot = rx.try_recv().unwrap();
            assert_eq!(snapshot.balls.len(), 2);
            assert_eq!(snapshot.balls[1].radius, 35);
        }
    }

    #[test]
    fn closed_channel_does_not_block_others() {
        let mut set = ObserverSet::new();
        let (a, mut rx_a) = ObserverChannel::new(1, 4);
        let (b, rx_b) = ObserverChannel::new(2, 4);
        let (c, mut rx_c) = ObserverChannel::new(3, 4);
        set.register(a);
        set.register(b);
        set.register(c);
        drop(rx_b);

        let report = set.broadcast(&balls());
        assert_eq!(report, BroadcastReport { delivered: 2, failed: 1 });
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_c.try_recv().is_ok());
    }

    #[test]
    fn failed_channels_are_never_pruned() {
        let mut set = ObserverSet::new();
        let (a, rx_a) = ObserverChannel::new(1, 4);
        set.register(a);
        drop(rx_a);

        for _ in 0..5 {
            set.broadcast(&balls());
        }
        assert_eq!(set.len(), 1);
        assert_eq!(set.channels[0].failures(), 5);
    }

    #[test]
    fn full_queue_drops_snapshot() {
        let mut set = ObserverSet::new();
        let (a, mut rx_a) = ObserverChannel::new(1, 1);
        set.register(a);

        assert_eq!(set.broadcast(&balls()).delivered, 1);
        assert_eq!(set.broadcast(&balls()).failed, 1);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_a.try_recv().is_err());
    }

    #[test]
    fn snapshot_preserves_order() {
        let snapshot = snapshot_from_balls(&balls());
        assert_eq!(snapshot.balls[0].x, 200);
        assert_eq!(snapshot.balls[1].x, 300);
        assert_eq!(snapshot.balls[1].color, [40, 50, 60]);
    }

    #[test]
    fn encoded_frame_is_tagged_snapshot() {
        let json = encode_snapshot(&snapshot_from_balls(&balls())).unwrap();
        assert!(json.starts_with(r#"{"type":"snapshot","balls":[{"x":200,"y":200,"vx":2,"vy":2,"radius":20,"color":[10,20,30]}"#));
    }
}
