//! Plain entity records. Positions are top-left pixel coordinates with y
//! growing downward, the same frame the window is described in.

use bevy::math::Vec2;
use rand::Rng;

pub const SCREEN_WIDTH: f32 = 1000.0;
pub const SCREEN_HEIGHT: f32 = 500.0;
/// Every sprite is a 64x64 image.
pub const SPRITE_SIZE: f32 = 64.0;
/// Lowest valid top edge for a sprite.
pub const MAX_Y: f32 = SCREEN_HEIGHT - SPRITE_SIZE;
/// Where a ready arrow waits, off screen.
pub const ARROW_SENTINEL: Vec2 = Vec2::new(-100.0, -100.0);

fn clamp_y(y: f32) -> f32 {
    y.clamp(0.0, MAX_Y)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BalloonMotion {
    /// Random step up, down or none every tick.
    Jitter,
    /// Constant vertical velocity that flips after a random number of ticks.
    #[default]
    Drift,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Balloon {
    pub pos: Vec2,
    pub vel: f32,
}

impl Balloon {
    pub fn new(y: f32, vel: f32) -> Self {
        Self {
            pos: Vec2::new(0.0, clamp_y(y)),
            vel,
        }
    }

    pub fn drift(&mut self) {
        self.pos.y = clamp_y(self.pos.y + self.vel);
    }

    pub fn reverse(&mut self) {
        self.vel = -self.vel;
    }

    pub fn jitter(&mut self, step: f32, rng: &mut impl Rng) {
        let dy = match rng.gen_range(0..3) {
            0 => step,
            1 => -step,
            _ => 0.0,
        };
        self.pos.y = clamp_y(self.pos.y + dy);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bow {
    pub pos: Vec2,
    pub speed: f32,
}

impl Bow {
    pub fn new(speed: f32) -> Self {
        Self {
            pos: Vec2::new(SCREEN_WIDTH - SPRITE_SIZE, (MAX_Y / 2.0).floor()),
            speed,
        }
    }

    pub fn move_up(&mut self) {
        self.pos.y = clamp_y(self.pos.y - self.speed);
    }

    pub fn move_down(&mut self) {
        self.pos.y = clamp_y(self.pos.y + self.speed);
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArrowState {
    Ready,
    Fire,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Arrow {
    pub pos: Vec2,
    pub speed: f32,
    pub state: ArrowState,
}

impl Arrow {
    pub fn new(speed: f32) -> Self {
        Self {
            pos: ARROW_SENTINEL,
            speed,
            state: ArrowState::Ready,
        }
    }

    /// Nock the arrow in front of the bow. Returns `false` while one is
    /// already in flight.
    pub fn fire(&mut self, bow: &Bow) -> bool {
        match self.state {
            ArrowState::Ready => {
                self.state = ArrowState::Fire;
                self.pos = Vec2::new(bow.pos.x - SPRITE_SIZE, bow.pos.y);
                true
            }
            ArrowState::Fire => false,
        }
    }

    pub fn advance(&mut self) {
        match self.state {
            ArrowState::Ready => {}
            ArrowState::Fire => {
                self.pos.x -= self.speed;
                if self.pos.x < 0.0 {
                    self.state = ArrowState::Ready;
                    self.pos = ARROW_SENTINEL;
                }
            }
        }
    }
}
