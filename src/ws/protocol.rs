//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::stats::AttemptStats;

/// Inbound value after coercion of the raw token
#[derive(Debug, Clone, PartialEq)]
pub enum CommandValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CommandValue {
    /// `true`/`false` become booleans, finite numeric tokens become numbers,
    /// anything else stays text.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "true" => return CommandValue::Bool(true),
            "false" => return CommandValue::Bool(false),
            _ => {}
        }

        match raw.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => CommandValue::Number(number),
            _ => CommandValue::Text(raw.to_string()),
        }
    }
}

/// Messages sent from client to server, one `"<key>,<value>"` text frame each
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// Engine on/off request
    IsBurning(bool),
    /// Pause/unpause request
    IsPaused(bool),
    /// Fuel load for the next attempt (kg)
    FuelMass(f64),
    /// Dry mass for the next attempt (kg)
    DryMass(f64),
    /// Resume a previous session
    SessionId(Uuid),
}

impl ClientCommand {
    /// Parse one inbound text frame
    pub fn parse(frame: &str) -> Result<Self, ProtocolError> {
        let Some((key, raw)) = frame.split_once(',') else {
            return Err(ProtocolError::UnknownMessage(frame.to_string()));
        };

        let value = CommandValue::coerce(raw);
        let invalid = || ProtocolError::InvalidValue {
            key: key.to_string(),
            frame: frame.to_string(),
        };

        match key {
            "isBurning" => match value {
                CommandValue::Bool(b) => Ok(ClientCommand::IsBurning(b)),
                _ => Err(invalid()),
            },
            "isPaused" => match value {
                CommandValue::Bool(b) => Ok(ClientCommand::IsPaused(b)),
                _ => Err(invalid()),
            },
            "fuelMass" => match value {
                CommandValue::Number(n) => Ok(ClientCommand::FuelMass(n)),
                _ => Err(invalid()),
            },
            "dryMass" => match value {
                CommandValue::Number(n) => Ok(ClientCommand::DryMass(n)),
                _ => Err(invalid()),
            },
            "sessionID" => match value {
                CommandValue::Text(text) => Uuid::parse_str(text.trim())
                    .map(ClientCommand::SessionId)
                    .map_err(|_| ProtocolError::InvalidSessionId(text)),
                _ => Err(invalid()),
            },
            _ => Err(ProtocolError::UnknownMessage(frame.to_string())),
        }
    }
}

/// Rejected inbound frames. The display text is echoed back to the client.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unknown message: {0}")]
    UnknownMessage(String),

    #[error("Invalid value for {key}: {frame}")]
    InvalidValue { key: String, frame: String },

    #[error("Invalid session identifier: {0}")]
    InvalidSessionId(String),
}

/// JSON object sent from server to client.
///
/// Every field is optional; each frame carries only what the event needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerFrame {
    #[serde(rename = "sessionID", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    /// Meters above the surface
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Vertical velocity, negative while descending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    /// Remaining fuel mass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_burning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<AttemptStats>,
    /// End-of-attempt text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Set only on the tick right after contact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_last_tick: Option<bool>,
}

/// Frame queued for the socket writer
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    /// Structured state or event frame, sent as JSON text
    State(ServerFrame),
    /// Plain text error echo
    Error(String),
}

impl OutboundFrame {
    pub fn into_text(self) -> Result<String, serde_json::Error> {
        match self {
            OutboundFrame::State(frame) => serde_json::to_string(&frame),
            OutboundFrame::Error(text) => Ok(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_rules() {
        assert_eq!(CommandValue::coerce("true"), CommandValue::Bool(true));
        assert_eq!(CommandValue::coerce("false"), CommandValue::Bool(false));
        assert_eq!(CommandValue::coerce("8200"), CommandValue::Number(8200.0));
        assert_eq!(CommandValue::coerce("-1.5"), CommandValue::Number(-1.5));
        assert_eq!(CommandValue::coerce("NaN"), CommandValue::Text("NaN".into()));
        assert_eq!(CommandValue::coerce("TRUE"), CommandValue::Text("TRUE".into()));
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(
            ClientCommand::parse("isBurning,true"),
            Ok(ClientCommand::IsBurning(true))
        );
        assert_eq!(
            ClientCommand::parse("isPaused,false"),
            Ok(ClientCommand::IsPaused(false))
        );
        assert_eq!(
            ClientCommand::parse("fuelMass,8200"),
            Ok(ClientCommand::FuelMass(8200.0))
        );
        assert_eq!(
            ClientCommand::parse("dryMass,4100.5"),
            Ok(ClientCommand::DryMass(4100.5))
        );

        let id = Uuid::new_v4();
        assert_eq!(
            ClientCommand::parse(&format!("sessionID,{}", id)),
            Ok(ClientCommand::SessionId(id))
        );
    }

    #[test]
    fn unknown_key_echoes_original_frame() {
        let err = ClientCommand::parse("restart,true").unwrap_err();
        assert_eq!(err.to_string(), "Unknown message: restart,true");

        let err = ClientCommand::parse("hello").unwrap_err();
        assert_eq!(err.to_string(), "Unknown message: hello");
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        assert!(matches!(
            ClientCommand::parse("isBurning,1"),
            Err(ProtocolError::InvalidValue { .. })
        ));
        assert!(matches!(
            ClientCommand::parse("fuelMass,lots"),
            Err(ProtocolError::InvalidValue { .. })
        ));
        assert!(matches!(
            ClientCommand::parse("sessionID,../../etc/passwd"),
            Err(ProtocolError::InvalidSessionId(_))
        ));
    }

    #[test]
    fn frame_omits_absent_fields() {
        let id = Uuid::new_v4();
        let frame = ServerFrame {
            session_id: Some(id),
            ..Default::default()
        };

        let text = OutboundFrame::State(frame).into_text().unwrap();
        assert_eq!(text, format!("{{\"sessionID\":\"{}\"}}", id));
    }

    #[test]
    fn frame_uses_client_field_names() {
        let frame = ServerFrame {
            altitude: Some(10.0),
            is_burning: Some(true),
            ended_last_tick: Some(true),
            ..Default::default()
        };

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["isBurning"], true);
        assert_eq!(json["endedLastTick"], true);
        assert_eq!(json["altitude"], 10.0);
    }
}
