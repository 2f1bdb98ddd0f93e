//! Pinch detection: a fixed proximity threshold plus a per-side edge
//! latch so one held pinch fires exactly one event.

use super::hand::{CamPoint, HandSample};

/// Index/thumb distance below which the hand counts as pinched, in
/// normalized camera units. Release crosses the same boundary; there is
/// no separate hysteresis threshold.
pub const PINCH_THRESHOLD: f64 = 0.04;

pub fn distance(a: CamPoint, b: CamPoint) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Strict `<`: a distance of exactly 0.04 is not a pinch.
pub fn is_pinched(index_tip: CamPoint, thumb_tip: CamPoint) -> bool {
    distance(index_tip, thumb_tip) < PINCH_THRESHOLD
}

/// Two states per side: idle and pinching. Transitions happen only on
/// threshold crossings, and the two sides are independent.
#[derive(Clone, Copy, Debug, Default)]
pub struct PinchLatch {
    active: bool,
}

impl PinchLatch {
    /// Feed one frame's sample. Returns the pinch midpoint in camera
    /// space on the idle → pinching transition, `None` otherwise.
    ///
    /// The release test uses the raw tip distance rather than
    /// `is_pinched`, so a hand that leaves the frame mid-pinch (stale
    /// tips retained, pinch flag forced off) stays latched until a later
    /// frame actually crosses the threshold.
    pub fn update(&mut self, sample: &HandSample) -> Option<CamPoint> {
        if sample.is_pinched && !self.active {
            self.active = true;
            return Some(CamPoint {
                x: (sample.index_tip.x + sample.thumb_tip.x) / 2.0,
                y: (sample.index_tip.y + sample.thumb_tip.y) / 2.0,
            });
        }
        if self.active && distance(sample.index_tip, sample.thumb_tip) >= PINCH_THRESHOLD {
            self.active = false;
        }
        None
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sample with the given tip separation along x.
    fn sample(separation: f64) -> HandSample {
        let index_tip = CamPoint { x: 0.5, y: 0.5 };
        let thumb_tip = CamPoint {
            x: 0.5 + separation,
            y: 0.5,
        };
        HandSample {
            present: true,
            is_pinched: is_pinched(index_tip, thumb_tip),
            index_tip,
            thumb_tip,
        }
    }

    #[test]
    fn held_pinch_fires_once() {
        let mut latch = PinchLatch::default();
        let mut events = 0;
        for _ in 0..30 {
            if latch.update(&sample(0.01)).is_some() {
                events += 1;
            }
        }
        assert_eq!(events, 1);
        assert!(latch.is_active());
    }

    #[test]
    fn threshold_is_strict() {
        // exactly at the threshold is not a pinch
        assert!(!is_pinched(
            CamPoint { x: 0.0, y: 0.0 },
            CamPoint { x: PINCH_THRESHOLD, y: 0.0 }
        ));
        assert!(is_pinched(
            CamPoint { x: 0.0, y: 0.0 },
            CamPoint { x: 0.039, y: 0.0 }
        ));
    }

    #[test]
    fn release_rearms_on_same_boundary() {
        let mut latch = PinchLatch::default();
        assert!(latch.update(&sample(0.039)).is_some());
        // rising to 0.041 releases without firing
        assert!(latch.update(&sample(0.041)).is_none());
        assert!(!latch.is_active());
        // the next dip below threshold fires again
        assert!(latch.update(&sample(0.039)).is_some());
    }

    #[test]
    fn event_carries_tip_midpoint() {
        let mut latch = PinchLatch::default();
        let mid = latch.update(&sample(0.02)).unwrap();
        assert!((mid.x - 0.51).abs() < 1e-9);
        assert!((mid.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn absent_hand_keeps_latch_until_distance_rises() {
        let mut latch = PinchLatch::default();
        assert!(latch.update(&sample(0.01)).is_some());
        // hand dropped out: pinch flag off, stale tips still close
        let mut absent = sample(0.01);
        absent.present = false;
        absent.is_pinched = false;
        assert!(latch.update(&absent).is_none());
        assert!(latch.is_active());
    }
}
