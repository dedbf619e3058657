use derivative::Derivative;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

#[derive(Derivative, Serialize, Deserialize, Sequence)]
#[derivative(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Side {
    #[derivative(Default)]
    Home,
    Away,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }
}

impl core::fmt::Display for Side {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::Home => write!(f, "Home"),
            Self::Away => write!(f, "Away"),
        }
    }
}

impl core::str::FromStr for Side {
    type Err = UnknownSide;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" | "h" | "local" => Ok(Self::Home),
            "away" | "a" | "visitor" => Ok(Self::Away),
            _ => Err(UnknownSide(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a side, expected `home` or `away`")]
pub struct UnknownSide(pub String);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_other() {
        assert_eq!(Side::Home.other(), Side::Away);
        assert_eq!(Side::Away.other(), Side::Home);
    }

    #[test]
    fn test_parse() {
        assert_eq!("home".parse(), Ok(Side::Home));
        assert_eq!(" A ".parse(), Ok(Side::Away));
        assert_eq!("Visitor".parse(), Ok(Side::Away));
        assert_eq!(
            "both".parse::<Side>(),
            Err(UnknownSide("both".to_string()))
        );
    }
}
