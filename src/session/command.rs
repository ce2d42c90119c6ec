use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Named session command, bindable to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    NarrowToMatches,
    ResetUniverse,
    AcceptOne,
    AcceptAll,
    AcceptOnly,
    EmitOne,
    EmitAll,
    Edit,
    QuitWithCode(u8),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

const QUIT_PREFIX: &str = "quit-with-code:";

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s.trim() {
            "narrow-to-matches" => Command::NarrowToMatches,
            "reset-universe" => Command::ResetUniverse,
            "accept-one" => Command::AcceptOne,
            "accept-all" => Command::AcceptAll,
            "accept-only" => Command::AcceptOnly,
            "emit-one" => Command::EmitOne,
            "emit-all" => Command::EmitAll,
            "edit" => Command::Edit,
            other => {
                let code = other
                    .strip_prefix(QUIT_PREFIX)
                    .and_then(|code| code.parse().ok())
                    .ok_or_else(|| UnknownCommand(s.to_string()))?;
                Command::QuitWithCode(code)
            }
        };
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::NarrowToMatches => "narrow-to-matches",
            Command::ResetUniverse => "reset-universe",
            Command::AcceptOne => "accept-one",
            Command::AcceptAll => "accept-all",
            Command::AcceptOnly => "accept-only",
            Command::EmitOne => "emit-one",
            Command::EmitAll => "emit-all",
            Command::Edit => "edit",
            Command::QuitWithCode(code) => return write!(f, "{}{}", QUIT_PREFIX, code),
        };
        f.write_str(name)
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("accept-one".parse(), Ok(Command::AcceptOne));
        assert_eq!(" edit ".parse(), Ok(Command::Edit));
        assert_eq!("quit-with-code:130".parse(), Ok(Command::QuitWithCode(130)));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("accept".parse::<Command>().is_err());
        assert!("quit-with-code:".parse::<Command>().is_err());
        assert!("quit-with-code:300".parse::<Command>().is_err());
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&Command::QuitWithCode(2)).unwrap();
        assert_eq!(json, "\"quit-with-code:2\"");
        let command: Command = serde_json::from_str("\"emit-one\"").unwrap();
        assert_eq!(command, Command::EmitOne);
        assert!(serde_json::from_str::<Command>("\"nope\"").is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for command in [
            Command::NarrowToMatches,
            Command::ResetUniverse,
            Command::AcceptOnly,
            Command::EmitAll,
            Command::QuitWithCode(1),
        ] {
            assert_eq!(command.to_string().parse(), Ok(command));
        }
    }
}
