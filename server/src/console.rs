//! Text commands accepted by the local server binary
//!
//! One event per line:
//! - `join <id>` / `spectate <id>` / `leave <id>`
//! - `send <id> <command> [value]` (value defaults to 1)
//! - `snapshot`

use hog_shared::ClientMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Join { participant: String, spectator: bool },
    Leave { participant: String },
    Send { participant: String, message: ClientMessage },
    Snapshot,
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Result<ConsoleInput, String> {
        let mut words = line.split_whitespace();
        let keyword = words.next().ok_or_else(|| "empty line".to_string())?;

        let input = match keyword {
            "join" | "spectate" => ConsoleInput::Join {
                participant: participant(words.next())?,
                spectator: keyword == "spectate",
            },
            "leave" => ConsoleInput::Leave {
                participant: participant(words.next())?,
            },
            "send" => {
                let participant = participant(words.next())?;
                let command = words
                    .next()
                    .ok_or_else(|| "send needs a command".to_string())?;
                let value = match words.next() {
                    Some(raw) => raw
                        .parse::<f64>()
                        .map_err(|e| format!("bad value {:?}: {}", raw, e))?,
                    None => 1.0,
                };
                ConsoleInput::Send {
                    participant,
                    message: ClientMessage::new(command, value),
                }
            }
            "snapshot" => ConsoleInput::Snapshot,
            other => return Err(format!("unknown input {:?}", other)),
        };

        match words.next() {
            Some(extra) => Err(format!("unexpected {:?}", extra)),
            None => Ok(input),
        }
    }
}

fn participant(word: Option<&str>) -> Result<String, String> {
    word.map(str::to_string)
        .ok_or_else(|| "missing participant id".to_string())
}
