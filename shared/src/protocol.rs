use serde::{Deserialize, Serialize};

use crate::config::Border;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// === Server -> Observer ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "snapshot")]
    Snapshot(SnapshotMsg),
}

/// Sent once when an observer channel is registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub border: Border,
}

/// Full ordered ball collection for one tick. Carries no sequence number;
/// observers match balls across snapshots by index only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMsg {
    pub balls: Vec<BallWire>,
}

/// One ball on the wire. Field order is part of the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallWire {
    pub x: i32,
    pub y: i32,
    pub vx: i32,
    pub vy: i32,
    pub radius: i32,
    pub color: [u8; 3],
}

// === Observer -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMsg {
    /// Ask the server for a ball of the given mass. Sent over its own connection.
    #[serde(rename = "add_ball")]
    AddBall { mass: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_msg_welcome_roundtrip() {
        let msg = ServerMsg::Welcome(WelcomeMsg {
            protocol_version: PROTOCOL_VERSION,
            border: Border::default(),
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"welcome\""));
        assert!(json.contains("\"protocolVersion\":1"));
        let parsed: ServerMsg = serde_json::from_str(&json).unwrap();
        match parsed {
            ServerMsg::Welcome(w) => {
                assert_eq!(w.protocol_version, PROTOCOL_VERSION);
                assert_eq!(w.border, Border::default());
            }
            _ => panic!("Expected Welcome"),
        }
    }

    #[test]
    fn snapshot_keeps_ball_field_order() {
        let msg = ServerMsg::Snapshot(SnapshotMsg {
            balls: vec![BallWire {
                x: 1,
                y: 2,
                vx: -3,
                vy: 4,
                radius: 25,
                color: [255, 0, 17],
            }],
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"snapshot","balls":[{"x":1,"y":2,"vx":-3,"vy":4,"radius":25,"color":[255,0,17]}]}"#
        );
    }

    #[test]
    fn empty_snapshot_parses() {
        let parsed: ServerMsg = serde_json::from_str(r#"{"type":"snapshot","balls":[]}"#).unwrap();
        match parsed {
            ServerMsg::Snapshot(s) => assert!(s.balls.is_empty()),
            _ => panic!("Expected Snapshot"),
        }
    }

    #[test]
    fn color_component_out_of_range_rejected() {
        let json = r#"{"type":"snapshot","balls":[{"x":0,"y":0,"vx":0,"vy":0,"radius":20,"color":[256,0,0]}]}"#;
        assert!(serde_json::from_str::<ServerMsg>(json).is_err());
    }

    #[test]
    fn client_msg_add_ball_roundtrip() {
        let msg = ClientMsg::AddBall { mass: 30 };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"add_ball","mass":30}"#);
        let parsed: ClientMsg = serde_json::from_str(&json).unwrap();
        match parsed {
            ClientMsg::AddBall { mass } => assert_eq!(mass, 30),
        }
    }
}
