use serde::{Deserialize, Serialize};

/// Inbound messages the sensor accepts at any point of its lifecycle.
///
/// On the wire a command is a JSON object tagged by `command`, e.g.
/// `{"command": "set-label", "label": "office"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
    Start,
    Stop,
    SetLabel { label: String },
    Sync,
    /// Boot-time start, honoured only when `CallsConfig::enabled` is set.
    StartEnabled,
    /// Host-wide stop for every sensor.
    StopAll,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::SetLabel { .. } => "set-label",
            Command::Sync => "sync",
            Command::StartEnabled => "start-enabled",
            Command::StopAll => "stop-all",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_from_tagged_json() {
        let label: Command =
            serde_json::from_str(r#"{"command":"set-label","label":"office"}"#).unwrap();
        let sync: Command = serde_json::from_str(r#"{"command":"sync"}"#).unwrap();
        let boot: Command = serde_json::from_str(r#"{"command":"start-enabled"}"#).unwrap();

        assert_eq!(
            label,
            Command::SetLabel {
                label: "office".into()
            }
        );
        assert_eq!(sync, Command::Sync);
        assert_eq!(boot.name(), "start-enabled");
    }

    #[test]
    fn set_label_requires_a_label() {
        assert!(serde_json::from_str::<Command>(r#"{"command":"set-label"}"#).is_err());
        assert!(serde_json::from_str::<Command>(r#"{"command":"reboot"}"#).is_err());
    }
}
