//! Discrete gesture vocabulary.

use serde::{Deserialize, Serialize};

/// A gesture candidate for one frame, or the stabilized gesture of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gesture {
    /// No recognised pose (or no hand).
    #[default]
    None,
    /// All four fingers extended. Disperses the formation.
    OpenPalm,
    /// All four fingers curled. Assembles the formation.
    ClosedFist,
    /// Thumb tip touching index tip. Triggers the love effect.
    PinchHeart,
    /// Index and middle extended. Triggers the wish effect.
    Victory,
    /// Only the index extended. Steers the formation's rotation.
    PointingUp,
}

impl Gesture {
    pub const ALL: [Gesture; 6] = [
        Gesture::None,
        Gesture::OpenPalm,
        Gesture::ClosedFist,
        Gesture::PinchHeart,
        Gesture::Victory,
        Gesture::PointingUp,
    ];

    /// Human-readable label for status displays.
    pub fn label(self) -> &'static str {
        match self {
            Gesture::None => "NONE",
            Gesture::OpenPalm => "OPEN PALM",
            Gesture::ClosedFist => "CLOSED FIST",
            Gesture::PinchHeart => "PINCH HEART",
            Gesture::Victory => "VICTORY",
            Gesture::PointingUp => "POINTING UP",
        }
    }

    pub fn is_none(self) -> bool {
        self == Gesture::None
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&Gesture::PinchHeart).unwrap(),
            "\"PINCH_HEART\""
        );
        let parsed: Gesture = serde_json::from_str("\"OPEN_PALM\"").unwrap();
        assert_eq!(parsed, Gesture::OpenPalm);
    }

    #[test]
    fn test_default_is_none() {
        assert!(Gesture::default().is_none());
        assert_eq!(Gesture::PointingUp.to_string(), "POINTING UP");
    }
}
