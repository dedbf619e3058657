use enum_derive_2018::{EnumDisplay, EnumFromStr};
use macro_attr_2018::macro_attr;
use serde::{Deserialize, Serialize};

macro_attr! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumDisplay!, EnumFromStr!)]
    pub enum Cue {
        Start,
        Stop,
        Click,
        Success,
        Notification,
        RegulationEnd,
        PausedTooLong,
        BreakOverrun,
    }
}

macro_attr! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumDisplay!)]
    pub enum HapticPattern {
        Start,
        Stop,
        Click,
        Success,
        Notification,
        Retry,
        Failure,
    }
}

impl Cue {
    pub fn haptic(self) -> HapticPattern {
        match self {
            Self::Start => HapticPattern::Start,
            Self::Stop | Self::RegulationEnd => HapticPattern::Stop,
            Self::Click => HapticPattern::Click,
            Self::Success => HapticPattern::Success,
            Self::Notification => HapticPattern::Notification,
            Self::PausedTooLong => HapticPattern::Retry,
            Self::BreakOverrun => HapticPattern::Failure,
        }
    }
}

impl HapticPattern {
    /// How many times the terminal bell rings for this pattern
    pub fn bells(self) -> usize {
        match self {
            Self::Click | Self::Notification => 1,
            Self::Start | Self::Stop | Self::Retry => 2,
            Self::Success | Self::Failure => 3,
        }
    }
}
