//! Serializable command surface for hosts that talk to the tracker over a
//! message channel (the bundled binary reads them as JSON lines).

use serde::{Deserialize, Serialize};

use crate::models::{AccelerationSample, MotionReading};

use super::{TrackerController, TrackerSnapshot};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    Start,
    Stop,
    Reset,
    ResetAll,
    ClearHistory,
    DeleteSession { index: i64 },
    SetSensitivity { value: f64 },
    Snapshot,
    Share,
    Sample(AccelerationSample),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommandOutput {
    Snapshot(TrackerSnapshot),
    Share { summary: Option<String> },
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    serde_json::from_str(line).map_err(|e| format!("invalid command: {e}"))
}

pub async fn dispatch(controller: &TrackerController, command: Command) -> CommandOutput {
    let snapshot = match command {
        Command::Start => controller.start().await,
        Command::Stop => controller.stop().await,
        Command::Reset => controller.reset().await,
        Command::ResetAll => controller.reset_all().await,
        Command::ClearHistory => controller.clear_history().await,
        Command::DeleteSession { index } => match usize::try_from(index) {
            Ok(index) => controller.delete_session(index).await,
            Err(_) => {
                log::debug!("delete ignored: negative index {index}");
                controller.snapshot().await
            }
        },
        Command::SetSensitivity { value } => controller.set_sensitivity(value).await,
        Command::Snapshot => controller.snapshot().await,
        Command::Share => {
            return CommandOutput::Share {
                summary: controller.share_summary().await,
            }
        }
        Command::Sample(sample) => {
            controller.on_motion(MotionReading::from_sample(sample)).await;
            controller.snapshot().await
        }
    };
    CommandOutput::Snapshot(snapshot)
}

/// Parses and runs one JSON command line.
pub async fn handle_line(controller: &TrackerController, line: &str) -> Result<CommandOutput, String> {
    let command = parse_command(line)?;
    Ok(dispatch(controller, command).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_commands() {
        assert_eq!(parse_command(r#"{"type":"start"}"#), Ok(Command::Start));
        assert_eq!(parse_command(r#"{"type":"resetAll"}"#), Ok(Command::ResetAll));
        assert_eq!(
            parse_command(r#"{"type":"deleteSession","index":3}"#),
            Ok(Command::DeleteSession { index: 3 })
        );
        assert_eq!(
            parse_command(r#"{"type":"setSensitivity","value":9.5}"#),
            Ok(Command::SetSensitivity { value: 9.5 })
        );
        assert_eq!(
            parse_command(r#"{"type":"sample","x":0.1,"y":-0.2,"z":9.8}"#),
            Ok(Command::Sample(AccelerationSample::new(0.1, -0.2, 9.8)))
        );
    }

    #[test]
    fn rejects_unknown_commands() {
        let err = parse_command(r#"{"type":"teleport"}"#).unwrap_err();
        assert!(err.starts_with("invalid command"));
        assert!(parse_command("not json").is_err());
    }
}
