//! Game session model: targets, score, lives, difficulty ramp.
//!
//! All mutable session state lives in [`SessionState`]; the reducer is
//! the only place it changes. The render loop and timers only dispatch
//! actions and read snapshots.

use serde::{Deserialize, Serialize};
use std::rc::Rc;
use yew::Reducible;

use crate::gesture::screen::{Screen, ScreenPoint};
use crate::util::Rng;

/// Fixed game screen, matching the 1280x720 camera capture.
pub const SCREEN_WIDTH: f64 = 1280.0;
pub const SCREEN_HEIGHT: f64 = 720.0;

/// Aliens alive for the whole session; recycled in place, never destroyed.
pub const TARGET_COUNT: usize = 4;
/// Respawn x lands in `[SPAWN_MARGIN_X, width - SPAWN_MARGIN_X]`.
pub const SPAWN_MARGIN_X: f64 = 150.0;
/// Respawn height above the top edge.
pub const RESPAWN_Y: f64 = -100.0;
/// Rendered alien bounds: 256px sprites at half scale, center anchored.
pub const TARGET_WIDTH: f64 = 128.0;
pub const TARGET_HEIGHT: f64 = 128.0;
/// How many alien sprite variants a target can respawn as.
pub const VARIANT_COUNT: u8 = 2;

pub const BASE_SPEED: f64 = 4.0;
pub const SPEED_INCREMENT: f64 = 1.0;
pub const STARTING_LIVES: u32 = 5;
/// Score lead over the ramp baseline that triggers a speed bump.
pub const RAMP_INTERVAL: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Sprite center, screen pixels.
    pub x: f64,
    pub y: f64,
    pub is_popped: bool,
    /// Which alien sprite this target currently wears.
    pub variant: u8,
    /// Bumped on every recycle. A pop recovery scheduled against an
    /// older generation is stale and must be ignored.
    pub generation: u64,
}

impl Target {
    /// Axis-aligned sprite bounds test.
    pub fn contains(&self, p: ScreenPoint) -> bool {
        (p.x - self.x).abs() <= TARGET_WIDTH / 2.0 && (p.y - self.y).abs() <= TARGET_HEIGHT / 2.0
    }
}

/// A pinch landing on a live target; becomes a [`SessionAction::Pop`]
/// plus a scheduled recovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PopHit {
    pub index: usize,
    pub generation: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub screen: Screen,
    pub targets: Vec<Target>,
    pub score: u32,
    /// Ramp baseline; moves to `score - 1` whenever the ramp fires, so
    /// the next bump re-triggers slightly early on purpose.
    pub last_ramp_score: u32,
    /// Fall speed in pixels per 60 Hz frame.
    pub speed: f64,
    pub lives: u32,
    rng: Rng,
}

impl SessionState {
    pub fn new(seed: u64) -> Self {
        let screen = Screen::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        let mut rng = Rng::new(seed);
        let mut targets = Vec::with_capacity(TARGET_COUNT);
        for _ in 0..TARGET_COUNT {
            targets.push(Target {
                x: rng.range(SPAWN_MARGIN_X, screen.width - SPAWN_MARGIN_X),
                // staggered entry: anywhere up to one screen above the top
                y: -(rng.next_f64() * screen.height),
                is_popped: false,
                variant: (rng.next_u64() % VARIANT_COUNT as u64) as u8,
                generation: 0,
            });
        }
        Self {
            screen,
            targets,
            score: 0,
            last_ramp_score: 0,
            speed: BASE_SPEED,
            lives: STARTING_LIVES,
            rng,
        }
    }

    /// Terminal once lives run out; there is no way back to running.
    pub fn is_over(&self) -> bool {
        self.lives == 0
    }

    /// Every unpopped target whose bounds contain `p`, in creation
    /// order. Overlapping targets all pop from a single pinch.
    pub fn hits_at(&self, p: ScreenPoint) -> Vec<PopHit> {
        self.targets
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_popped && t.contains(p))
            .map(|(index, t)| PopHit {
                index,
                generation: t.generation,
            })
            .collect()
    }

    /// Reposition a target above the screen with fresh x/variant and a
    /// new generation, clearing its pop flag.
    fn recycle(&mut self, index: usize) {
        let x = self.rng.range(SPAWN_MARGIN_X, self.screen.width - SPAWN_MARGIN_X);
        let variant = (self.rng.next_u64() % VARIANT_COUNT as u64) as u8;
        let t = &mut self.targets[index];
        t.x = x;
        t.y = RESPAWN_Y;
        t.is_popped = false;
        t.variant = variant;
        t.generation += 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionAction {
    /// One animation tick; `dt` in 60 Hz frame units.
    Advance { dt: f64 },
    /// A pinch hit this target (from [`SessionState::hits_at`]).
    Pop { index: usize, generation: u64 },
    /// The 250 ms pop-recovery timer fired for this target.
    Recover { index: usize, generation: u64 },
}

impl Reducible for SessionState {
    type Action = SessionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        if self.is_over() {
            // terminal: late timers and stray ticks change nothing
            return self;
        }
        let mut new = (*self).clone();
        match action {
            SessionAction::Advance { dt } => {
                if new.score - new.last_ramp_score > RAMP_INTERVAL {
                    new.last_ramp_score = new.score - 1;
                    new.speed += SPEED_INCREMENT;
                }
                for i in 0..new.targets.len() {
                    new.targets[i].y += dt * new.speed;
                    if new.targets[i].y > new.screen.height {
                        if !new.targets[i].is_popped {
                            new.lives = new.lives.saturating_sub(1);
                        }
                        // full recycle; bumping the generation voids any
                        // recovery still pending for this target
                        new.recycle(i);
                    }
                }
            }
            SessionAction::Pop { index, generation } => {
                if let Some(t) = new.targets.get_mut(index) {
                    if t.generation == generation && !t.is_popped {
                        t.is_popped = true;
                        new.score += 1;
                    }
                }
            }
            SessionAction::Recover { index, generation } => {
                if index < new.targets.len() && new.targets[index].generation == generation {
                    new.recycle(index);
                }
            }
        }
        Rc::new(new)
    }
}
