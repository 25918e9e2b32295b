use crate::model::peer::{PeerDescriptor, PeerId};
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Trickle ICE candidate payload, shaped like the browser's
/// `RTCIceCandidateInit` so both sides can pass it through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInit {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
}

/// The envelope every rendezvous message travels in: `{type, sender, data}`
/// plus an optional `recipient` for directed forwards. The server stamps
/// `sender`; clients never set it themselves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignalMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<PeerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<PeerId>,
    #[serde(flatten)]
    pub kind: SignalKind,
}

/// Message kinds and their `data` payloads. Unrecognized kinds parse into
/// `Unknown` so a newer server never kills an older client; unrecognized
/// fields are ignored outright.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SignalKind {
    Init {
        client_id: PeerId,
    },
    JoinRoom {
        room_id: RoomId,
        username: String,
    },
    RoomJoined {
        #[serde(default)]
        room: RoomId,
        peers: Vec<PeerDescriptor>,
    },
    NewPeer {
        username: String,
    },
    PeerLeft,
    Leave,
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    IceCandidate {
        candidate: CandidateInit,
    },
    #[serde(other)]
    Unknown,
}

impl SignalMessage {
    /// Message with no addressing, e.g. `join-room` or `leave`.
    pub fn broadcast(kind: SignalKind) -> Self {
        Self {
            sender: None,
            recipient: None,
            kind,
        }
    }

    /// Message directed at a single peer, relayed by the server.
    pub fn to(recipient: PeerId, kind: SignalKind) -> Self {
        Self {
            sender: None,
            recipient: Some(recipient),
            kind,
        }
    }

    /// Server-side constructor: stamps the authoritative sender.
    pub fn from_peer(sender: PeerId, kind: SignalKind) -> Self {
        Self {
            sender: Some(sender),
            recipient: None,
            kind,
        }
    }
}
