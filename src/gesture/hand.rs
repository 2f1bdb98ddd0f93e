//! Hand resolution: routes raw per-frame detections onto stable
//! left/right samples and extracts the two landmarks the game needs.

use serde::{Deserialize, Serialize};

/// MediaPipe 21-point hand landmark indices (only the two we use).
/// See: https://google.github.io/mediapipe/solutions/hands.html
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const LANDMARK_COUNT: usize = 21;

/// A point in normalized camera space, `(x, y) ∈ [0,1]²`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CamPoint {
    pub x: f64,
    pub y: f64,
}

/// One detected hand as decoded from the landmarker result.
#[derive(Clone, Debug, Deserialize)]
pub struct DetectedHand {
    /// Handedness category index; 1 routes to the left slot, 0 to the right.
    pub handedness: u8,
    pub landmarks: Vec<CamPoint>,
}

/// Everything the landmarker reported for a single video frame.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FrameDetections {
    pub hands: Vec<DetectedHand>,
}

/// Per-side snapshot, refreshed every frame the hand is detected.
/// When the hand drops out, `present`/`is_pinched` reset but the tips
/// keep their last value; the pinch latch relies on that carry-over.
#[derive(Clone, Copy, Debug, Default)]
pub struct HandSample {
    pub present: bool,
    pub is_pinched: bool,
    pub index_tip: CamPoint,
    pub thumb_tip: CamPoint,
}

impl HandSample {
    fn update(&mut self, hand: &DetectedHand) {
        self.present = true;
        self.index_tip = hand.landmarks[INDEX_TIP];
        self.thumb_tip = hand.landmarks[THUMB_TIP];
        self.is_pinched = super::pinch::is_pinched(self.index_tip, self.thumb_tip);
    }

    fn clear_presence(&mut self) {
        self.present = false;
    }
}

/// Frame-to-frame left/right resolution. No smoothing across frames;
/// jitter in the detections passes straight through.
#[derive(Clone, Debug, Default)]
pub struct HandTracking {
    pub left: HandSample,
    pub right: HandSample,
}

impl HandTracking {
    /// Update both samples from one frame's detections.
    ///
    /// With two hands the slot assignment comes from the first
    /// detection's handedness label, so a stable detection order keeps
    /// a stable assignment.
    pub fn resolve(&mut self, frame: &FrameDetections) {
        match frame.hands.as_slice() {
            [] => {
                self.left.clear_presence();
                self.right.clear_presence();
                self.left.is_pinched = false;
                self.right.is_pinched = false;
            }
            [only] => {
                if only.handedness == 1 {
                    self.left.update(only);
                    self.right.clear_presence();
                } else {
                    self.right.update(only);
                    self.left.clear_presence();
                }
            }
            [first, second, ..] => {
                if first.handedness == 1 {
                    self.left.update(first);
                    self.right.update(second);
                } else {
                    self.left.update(second);
                    self.right.update(first);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(handedness: u8, tip_x: f64) -> DetectedHand {
        let mut landmarks = vec![CamPoint::default(); LANDMARK_COUNT];
        landmarks[THUMB_TIP] = CamPoint { x: tip_x, y: 0.5 };
        landmarks[INDEX_TIP] = CamPoint { x: tip_x + 0.2, y: 0.5 };
        DetectedHand { handedness, landmarks }
    }

    #[test]
    fn single_hand_routes_by_handedness() {
        let mut tracking = HandTracking::default();
        tracking.resolve(&FrameDetections { hands: vec![hand(1, 0.3)] });
        assert!(tracking.left.present);
        assert!(!tracking.right.present);
        assert_eq!(tracking.left.thumb_tip.x, 0.3);

        tracking.resolve(&FrameDetections { hands: vec![hand(0, 0.7)] });
        assert!(tracking.right.present);
        assert!(!tracking.left.present);
        assert_eq!(tracking.right.thumb_tip.x, 0.7);
        // left tips survive the presence clear
        assert_eq!(tracking.left.thumb_tip.x, 0.3);
    }

    #[test]
    fn two_hand_assignment_is_stable() {
        let mut tracking = HandTracking::default();
        for _ in 0..5 {
            tracking.resolve(&FrameDetections {
                hands: vec![hand(1, 0.2), hand(0, 0.8)],
            });
            assert_eq!(tracking.left.thumb_tip.x, 0.2);
            assert_eq!(tracking.right.thumb_tip.x, 0.8);
        }
        // reversed detection order still routes by label
        tracking.resolve(&FrameDetections {
            hands: vec![hand(0, 0.8), hand(1, 0.2)],
        });
        assert_eq!(tracking.left.thumb_tip.x, 0.2);
        assert_eq!(tracking.right.thumb_tip.x, 0.8);
    }

    #[test]
    fn empty_frame_clears_flags_but_keeps_tips() {
        let mut tracking = HandTracking::default();
        tracking.resolve(&FrameDetections {
            hands: vec![hand(1, 0.4), hand(0, 0.6)],
        });
        assert!(tracking.left.present && tracking.right.present);

        tracking.resolve(&FrameDetections::default());
        assert!(!tracking.left.present);
        assert!(!tracking.right.present);
        assert!(!tracking.left.is_pinched);
        assert!(!tracking.right.is_pinched);
        assert_eq!(tracking.left.thumb_tip.x, 0.4);
        assert_eq!(tracking.right.thumb_tip.x, 0.6);
    }
}
