use refone_common::side::Side;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    StartMatch,
    ToggleClock,
    EndHalf,
    EndBreak,
    EndMatch,
    Goal(Side),
    Quit,
}

pub const HELP: &str = "\
commands: s/start  p/pause (toggle clock)  h/half  b/break  e/end
          gh/goal home  ga/goal away  q/quit";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown command: {0:?}")]
pub struct UnknownCommand(pub String);

impl FromStr for Message {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let mut words = lower.split_whitespace();
        let message = match (words.next(), words.next(), words.next()) {
            (Some("s" | "start"), None, None) => Self::StartMatch,
            (Some("p" | "pause" | "resume" | "toggle"), None, None) => Self::ToggleClock,
            (Some("h" | "half"), None, None) => Self::EndHalf,
            (Some("b" | "break"), None, None) => Self::EndBreak,
            (Some("e" | "end"), None, None) => Self::EndMatch,
            (Some("q" | "quit"), None, None) => Self::Quit,
            (Some("gh"), None, None) => Self::Goal(Side::Home),
            (Some("ga"), None, None) => Self::Goal(Side::Away),
            (Some("g" | "goal"), Some(side), None) => Self::Goal(
                side.parse()
                    .map_err(|_| UnknownCommand(s.trim().to_string()))?,
            ),
            _ => return Err(UnknownCommand(s.trim().to_string())),
        };
        Ok(message)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("s".parse(), Ok(Message::StartMatch));
        assert_eq!(" Pause \n".parse(), Ok(Message::ToggleClock));
        assert_eq!("half".parse(), Ok(Message::EndHalf));
        assert_eq!("b".parse(), Ok(Message::EndBreak));
        assert_eq!("END".parse(), Ok(Message::EndMatch));
        assert_eq!("q".parse(), Ok(Message::Quit));
        assert_eq!("gh".parse(), Ok(Message::Goal(Side::Home)));
        assert_eq!("goal away".parse(), Ok(Message::Goal(Side::Away)));
        assert_eq!("g  visitor".parse(), Ok(Message::Goal(Side::Away)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "goal nobody".parse::<Message>(),
            Err(UnknownCommand("goal nobody".to_string()))
        );
        assert!("".parse::<Message>().is_err());
        assert!("start now".parse::<Message>().is_err());
        assert!("x".parse::<Message>().is_err());
    }
}
