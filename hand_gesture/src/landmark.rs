//! Landmark sets — 21 ordered 2D points per detected hand.
//!
//! Index layout of the hand model:
//!
//! ```text
//!            8   12  16  20      tips
//!            7   11  15  19
//!        4   6   10  14  18
//!        3   5   9   13  17      knuckles
//!         2
//!          1
//!            0                   wrist
//! ```

// ════════════════════════════════════════════════════════════════════════════
// Index constants
// ════════════════════════════════════════════════════════════════════════════

pub const HAND_LANDMARKS: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP:   usize = 16;
pub const PINKY_TIP:  usize = 20;

/// Joints per finger (base knuckle through tip).
const JOINTS_PER_FINGER: usize = 4;

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// A single point, in the detector's camera pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Landmark { x, y }
    }

    /// Euclidean distance.
    pub fn distance(self, other: Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Landmark) -> Landmark {
        Landmark::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn offset(self, dx: f32, dy: f32) -> Landmark {
        Landmark::new(self.x + dx, self.y + dy)
    }

    fn lerp(self, other: Landmark, t: f32) -> Landmark {
        Landmark::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Hand
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand.  Produced fresh by every detection call; carries no
/// identity across frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    pub landmarks: [Landmark; HAND_LANDMARKS],
}

impl Hand {
    pub fn new(landmarks: [Landmark; HAND_LANDMARKS]) -> Self {
        Hand { landmarks }
    }

    /// Build from a detector's flat point list.  Returns `None` unless the
    /// list has exactly [`HAND_LANDMARKS`] entries.
    pub fn from_points(points: &[Landmark]) -> Option<Self> {
        let landmarks: [Landmark; HAND_LANDMARKS] = points.try_into().ok()?;
        Some(Hand { landmarks })
    }

    pub fn landmark(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    pub fn thumb_tip(&self) -> Landmark { self.landmark(THUMB_TIP) }
    pub fn index_tip(&self) -> Landmark { self.landmark(INDEX_TIP) }
    pub fn wrist(&self)     -> Landmark { self.landmark(WRIST) }

    /// Distance between thumb tip and index fingertip.
    pub fn pinch_distance(&self) -> f32 {
        self.thumb_tip().distance(self.index_tip())
    }

    /// A plausible open hand whose thumb and index tips sit exactly at the
    /// given points.  The wrist hangs below the index tip and the remaining
    /// fingertips fan out to its right; every finger's joints are spaced
    /// evenly between wrist and tip.
    ///
    /// Used by the pointer-driven simulator and by tests.
    pub fn synthetic(index_tip: Landmark, thumb_tip: Landmark) -> Self {
        let wrist = index_tip.offset(20.0, 170.0);
        let tips = [
            thumb_tip,
            index_tip,
            index_tip.offset(26.0, -6.0),
            index_tip.offset(50.0, 10.0),
            index_tip.offset(70.0, 34.0),
        ];

        let mut landmarks = [wrist; HAND_LANDMARKS];
        for (finger, tip) in tips.iter().enumerate() {
            let base = 1 + finger * JOINTS_PER_FINGER;
            for joint in 0..JOINTS_PER_FINGER - 1 {
                let t = (joint + 1) as f32 / JOINTS_PER_FINGER as f32;
                landmarks[base + joint] = wrist.lerp(*tip, t);
            }
            landmarks[base + JOINTS_PER_FINGER - 1] = *tip;
        }
        Hand { landmarks }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tip_indices_follow_hand_model() {
        assert_eq!(THUMB_TIP, 4);
        assert_eq!(INDEX_TIP, 8);
        assert_eq!(PINKY_TIP, HAND_LANDMARKS - 1);
        assert_eq!(MIDDLE_TIP, INDEX_TIP + JOINTS_PER_FINGER);
        assert_eq!(RING_TIP, MIDDLE_TIP + JOINTS_PER_FINGER);
    }

    #[test]
    fn distance_and_midpoint() {
        let a = Landmark::new(100.0, 100.0);
        let b = Landmark::new(110.0, 105.0);
        assert!((a.distance(b) - 11.180_34).abs() < 1e-3);
        assert_eq!(a.midpoint(b), Landmark::new(105.0, 102.5));
    }

    #[test]
    fn from_points_requires_full_set() {
        let short = vec![Landmark::default(); 8];
        assert!(Hand::from_points(&short).is_none());

        let full: Vec<Landmark> = (0..HAND_LANDMARKS)
            .map(|i| Landmark::new(i as f32, 0.0))
            .collect();
        let hand = Hand::from_points(&full).unwrap();
        assert_eq!(hand.index_tip(), Landmark::new(8.0, 0.0));
    }

    #[test]
    fn synthetic_hand_places_tips_exactly() {
        let index = Landmark::new(400.0, 300.0);
        let thumb = Landmark::new(340.0, 350.0);
        let hand = Hand::synthetic(index, thumb);
        assert_eq!(hand.index_tip(), index);
        assert_eq!(hand.thumb_tip(), thumb);
        assert!(hand.wrist().y > index.y);
        assert_eq!(hand.landmark(PINKY_TIP), index.offset(70.0, 34.0));
    }

    #[test]
    fn synthetic_pinch_distance() {
        let hand = Hand::synthetic(Landmark::new(110.0, 105.0), Landmark::new(100.0, 100.0));
        assert!(hand.pinch_distance() < 30.0);
    }
}
