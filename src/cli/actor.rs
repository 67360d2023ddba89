//! Line-oriented actor commands read by `courtroom run`.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{MessageId, MessageSource};

/// One command typed by the external actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorCommand {
    Enqueue { source: MessageSource, text: String },
    Resolve(MessageId),
    List,
    Reset,
    Disable,
    Enable,
    Quit,
}

impl ActorCommand {
    /// Parse a single input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> DomainResult<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_lowercase().as_str() {
            "enqueue" | "post" => {
                let (source, text) = rest
                    .split_once(char::is_whitespace)
                    .map(|(s, t)| (s, t.trim()))
                    .unwrap_or((rest, ""));
                if source.is_empty() {
                    return Err(DomainError::InvalidCommand(
                        "usage: enqueue <source> <text>".to_string(),
                    ));
                }
                let source: MessageSource = source.parse()?;
                if text.is_empty() {
                    return Err(DomainError::EmptyText);
                }
                Self::Enqueue {
                    source,
                    text: text.to_string(),
                }
            }
            "resolve" | "handle" => {
                let id = rest.parse::<MessageId>().map_err(|_| {
                    DomainError::InvalidCommand(format!("expected a message id, got '{rest}'"))
                })?;
                Self::Resolve(id)
            }
            "list" | "ls" => Self::List,
            "reset" => Self::Reset,
            "disable" | "stop" => Self::Disable,
            "enable" | "start" => Self::Enable,
            "quit" | "exit" => Self::Quit,
            other => return Err(DomainError::InvalidCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enqueue() {
        let cmd = ActorCommand::parse("enqueue boss fix secure database").unwrap();
        assert_eq!(
            cmd,
            Some(ActorCommand::Enqueue {
                source: MessageSource::Boss,
                text: "fix secure database".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_resolve() {
        assert_eq!(
            ActorCommand::parse("resolve 7").unwrap(),
            Some(ActorCommand::Resolve(7))
        );
        assert!(matches!(
            ActorCommand::parse("resolve seven"),
            Err(DomainError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_parse_simple_verbs() {
        assert_eq!(ActorCommand::parse("LIST").unwrap(), Some(ActorCommand::List));
        assert_eq!(ActorCommand::parse("reset").unwrap(), Some(ActorCommand::Reset));
        assert_eq!(ActorCommand::parse("stop").unwrap(), Some(ActorCommand::Disable));
        assert_eq!(ActorCommand::parse("enable").unwrap(), Some(ActorCommand::Enable));
        assert_eq!(ActorCommand::parse("quit").unwrap(), Some(ActorCommand::Quit));
        assert_eq!(ActorCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ActorCommand::parse("enqueue cat meow"),
            Err(DomainError::UnknownSource(_))
        ));
        assert!(matches!(
            ActorCommand::parse("enqueue boss"),
            Err(DomainError::EmptyText)
        ));
        assert!(matches!(
            ActorCommand::parse("enqueue"),
            Err(DomainError::InvalidCommand(_))
        ));
        assert!(matches!(
            ActorCommand::parse("dance"),
            Err(DomainError::InvalidCommand(_))
        ));
    }
}
