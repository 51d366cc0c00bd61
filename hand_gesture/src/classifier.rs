//! Gesture classification — landmark set → per-frame [`Trigger`].
//!
//! The classifier is stateless: every call looks only at the detections it
//! is handed, so sustained presence in point mode yields a trigger on every
//! frame.

use std::fmt;

use serde::Deserialize;

use crate::landmark::{Hand, Landmark};

/// Thumb–index distance (camera pixels) under which a pinch fires.
pub const DEFAULT_PINCH_THRESHOLD: f32 = 30.0;

// ════════════════════════════════════════════════════════════════════════════
// GestureMode
// ════════════════════════════════════════════════════════════════════════════

/// Which gesture the classifier looks for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureMode {
    /// Any visible hand triggers at its index fingertip.
    #[default]
    Point,
    /// Triggers only while thumb and index tips are closer than the threshold.
    Pinch,
}

impl GestureMode {
    pub fn toggled(self) -> Self {
        match self {
            GestureMode::Point => GestureMode::Pinch,
            GestureMode::Pinch => GestureMode::Point,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GestureMode::Point => "point",
            GestureMode::Pinch => "pinch",
        }
    }
}

impl fmt::Display for GestureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Trigger
// ════════════════════════════════════════════════════════════════════════════

/// Discrete outcome of one frame's classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trigger {
    None,
    Point { anchor: Landmark },
    Pinch { anchor: Landmark },
}

impl Trigger {
    /// Where particles should spawn, if anywhere.
    pub fn anchor(&self) -> Option<Landmark> {
        match *self {
            Trigger::None               => None,
            Trigger::Point { anchor }   => Some(anchor),
            Trigger::Pinch { anchor }   => Some(anchor),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Trigger::None)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureClassifier {
    pub mode:            GestureMode,
    pub pinch_threshold: f32,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        GestureClassifier {
            mode:            GestureMode::Point,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
        }
    }
}

impl GestureClassifier {
    pub fn new(mode: GestureMode, pinch_threshold: f32) -> Self {
        GestureClassifier { mode, pinch_threshold }
    }

    /// Classify the latest detections.  Only the first hand is considered;
    /// an empty slice is the ordinary "no hand" outcome.
    pub fn classify(&self, hands: &[Hand]) -> Trigger {
        let Some(hand) = hands.first() else {
            return Trigger::None;
        };

        match self.mode {
            GestureMode::Point => Trigger::Point { anchor: hand.index_tip() },
            GestureMode::Pinch => {
                let thumb = hand.thumb_tip();
                let index = hand.index_tip();
                // Strict: a distance equal to the threshold is not a pinch.
                if thumb.distance(index) < self.pinch_threshold {
                    Trigger::Pinch { anchor: thumb.midpoint(index) }
                } else {
                    Trigger::None
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn pinch() -> GestureClassifier {
        GestureClassifier::new(GestureMode::Pinch, 30.0)
    }

    #[test]
    fn no_hand_is_none_in_both_modes() {
        assert_eq!(GestureClassifier::default().classify(&[]), Trigger::None);
        assert_eq!(pinch().classify(&[]), Trigger::None);
    }

    #[test]
    fn point_anchors_at_index_tip() {
        let hand = Hand::synthetic(Landmark::new(400.0, 300.0), Landmark::new(300.0, 380.0));
        let t = GestureClassifier::default().classify(&[hand]);
        assert_eq!(t, Trigger::Point { anchor: Landmark::new(400.0, 300.0) });
    }

    #[test]
    fn point_fires_every_call_without_debounce() {
        let c = GestureClassifier::default();
        let hands = [Hand::synthetic(Landmark::new(10.0, 10.0), Landmark::new(90.0, 90.0))];
        for _ in 0..5 {
            assert!(!c.classify(&hands).is_none());
        }
    }

    #[test]
    fn pinch_fires_with_midpoint_anchor() {
        let hand = Hand::synthetic(Landmark::new(110.0, 105.0), Landmark::new(100.0, 100.0));
        let t = pinch().classify(&[hand]);
        assert_eq!(t, Trigger::Pinch { anchor: Landmark::new(105.0, 102.5) });
    }

    #[test]
    fn pinch_boundary_is_strict() {
        // 3-4-5 triangle scaled to exactly 30 px.
        let hand = Hand::synthetic(Landmark::new(118.0, 124.0), Landmark::new(100.0, 100.0));
        assert_eq!(hand.pinch_distance(), 30.0);
        assert_eq!(pinch().classify(&[hand]), Trigger::None);
    }

    #[test]
    fn open_hand_is_not_a_pinch() {
        let hand = Hand::synthetic(Landmark::new(400.0, 300.0), Landmark::new(330.0, 350.0));
        assert_eq!(pinch().classify(&[hand]), Trigger::None);
    }

    #[test]
    fn only_first_hand_counts() {
        let open    = Hand::synthetic(Landmark::new(400.0, 300.0), Landmark::new(330.0, 350.0));
        let pinched = Hand::synthetic(Landmark::new(110.0, 105.0), Landmark::new(100.0, 100.0));
        assert_eq!(pinch().classify(&[open, pinched]), Trigger::None);
    }

    #[test]
    fn mode_toggles() {
        assert_eq!(GestureMode::Point.toggled(), GestureMode::Pinch);
        assert_eq!(GestureMode::Pinch.toggled().to_string(), "point");
    }
}
