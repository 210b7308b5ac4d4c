//! Cyber Breaker: brick breaker with five authored levels. Clearing the
//! last level wins the whole game rather than looping.

use glam::Vec2;
use rand::Rng;

use super::collision::{self, Aabb};
use super::{GameEvent, SimCommon, TickInput};
use crate::audio::SfxCue;

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 600.0;

pub const PADDLE_WIDTH: f32 = 120.0;
pub const PADDLE_HEIGHT: f32 = 20.0;
pub const PADDLE_Y: f32 = HEIGHT - 40.0;
const PADDLE_SPEED: f32 = 9.0;

pub const BALL_RADIUS: f32 = 10.0;
const BASE_BALL_SPEED: f32 = 5.0;
const PADDLE_SPEEDUP: f32 = 0.1;
const MAX_BALL_SPEED: f32 = 14.0;
/// Paddle reflection fans the ball up to 60° off vertical
const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::PI / 3.0;

pub const BRICK_COLS: usize = 8;
pub const BRICK_WIDTH: f32 = 90.0;
pub const BRICK_HEIGHT: f32 = 25.0;
const BRICK_GAP: f32 = 8.0;
const BRICK_TOP: f32 = 60.0;
const BRICK_LEFT: f32 = (WIDTH - (BRICK_WIDTH + BRICK_GAP) * BRICK_COLS as f32 + BRICK_GAP) / 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrickPattern {
    Full,
    Checkered,
    Sparse,
}

#[derive(Debug, Clone, Copy)]
pub struct LevelSpec {
    pub rows: usize,
    pub speed_mod: f32,
    pub pattern: BrickPattern,
}

pub const LEVELS: [LevelSpec; 5] = [
    LevelSpec { rows: 3, speed_mod: 1.0, pattern: BrickPattern::Full },
    LevelSpec { rows: 3, speed_mod: 1.2, pattern: BrickPattern::Checkered },
    LevelSpec { rows: 4, speed_mod: 1.4, pattern: BrickPattern::Full },
    LevelSpec { rows: 5, speed_mod: 1.6, pattern: BrickPattern::Sparse },
    LevelSpec { rows: 6, speed_mod: 1.8, pattern: BrickPattern::Full },
];

#[derive(Debug, Clone, Copy)]
pub struct Brick {
    pub rect: Aabb,
    pub row: usize,
}

#[derive(Debug)]
pub struct BreakerState {
    pub common: SimCommon,
    pub level: u32,
    pub paddle_x: f32,
    pub ball_pos: Vec2,
    pub ball_vel: Vec2,
    pub ball_speed: f32,
    pub base_ball_speed: f32,
    pub launched: bool,
    pub bricks: Vec<Brick>,
}

impl BreakerState {
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            common: SimCommon::new(seed),
            level: 1,
            paddle_x: (WIDTH - PADDLE_WIDTH) / 2.0,
            ball_pos: Vec2::ZERO,
            ball_vel: Vec2::ZERO,
            ball_speed: BASE_BALL_SPEED,
            base_ball_speed: BASE_BALL_SPEED,
            launched: false,
            bricks: Vec::new(),
        };
        state.load_level();
        state
    }

    /// Called when restarting into the next level after a clear; score and
    /// RNG carry over.
    pub fn advance_level(&mut self) {
        if (self.level as usize) < LEVELS.len() {
            self.level += 1;
        }
        self.load_level();
    }

    fn spec(&self) -> LevelSpec {
        LEVELS[(self.level as usize - 1).min(LEVELS.len() - 1)]
    }

    fn load_level(&mut self) {
        let spec = self.spec();
        self.base_ball_speed = BASE_BALL_SPEED * spec.speed_mod;
        self.ball_speed = self.base_ball_speed;
        self.launched = false;
        self.paddle_x = (WIDTH - PADDLE_WIDTH) / 2.0;
        self.park_ball();

        self.bricks.clear();
        for row in 0..spec.rows {
            for col in 0..BRICK_COLS {
                let present = match spec.pattern {
                    BrickPattern::Full => true,
                    BrickPattern::Checkered => (row + col) % 2 == 0,
                    BrickPattern::Sparse => self.common.rng.random_range(0.0..1.0) < 0.7,
                };
                if present {
                    self.bricks.push(Brick {
                        rect: Aabb::new(
                            BRICK_LEFT + col as f32 * (BRICK_WIDTH + BRICK_GAP),
                            BRICK_TOP + row as f32 * (BRICK_HEIGHT + BRICK_GAP),
                            BRICK_WIDTH,
                            BRICK_HEIGHT,
                        ),
                        row,
                    });
                }
            }
        }
    }

    fn park_ball(&mut self) {
        self.ball_pos = Vec2::new(
            self.paddle_x + PADDLE_WIDTH / 2.0,
            PADDLE_Y - BALL_RADIUS - 1.0,
        );
        self.ball_vel = Vec2::ZERO;
    }

    pub fn paddle_rect(&self) -> Aabb {
        Aabb::new(self.paddle_x, PADDLE_Y, PADDLE_WIDTH, PADDLE_HEIGHT)
    }

    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if !self.common.alive {
            return;
        }
        self.common.frames += 1;

        if input.left {
            self.paddle_x -= PADDLE_SPEED * dt;
        }
        if input.right {
            self.paddle_x += PADDLE_SPEED * dt;
        }
        self.paddle_x = self.paddle_x.clamp(0.0, WIDTH - PADDLE_WIDTH);

        if !self.launched {
            self.park_ball();
            if input.primary_pressed {
                self.launched = true;
                self.ball_vel = Vec2::new(0.0, -self.ball_speed);
                self.common.sfx(SfxCue::Paddle);
            }
            self.common.fx.advance(dt);
            return;
        }

        self.ball_pos += self.ball_vel * dt;

        // Walls: strict overlap only, a tangent ball flies on
        if self.ball_pos.x - BALL_RADIUS < 0.0 && self.ball_vel.x < 0.0 {
            self.ball_pos.x = BALL_RADIUS;
            self.ball_vel = collision::reflect(self.ball_vel, Vec2::new(1.0, 0.0));
            self.common.sfx(SfxCue::Wall);
        }
        if self.ball_pos.x + BALL_RADIUS > WIDTH && self.ball_vel.x > 0.0 {
            self.ball_pos.x = WIDTH - BALL_RADIUS;
            self.ball_vel = collision::reflect(self.ball_vel, Vec2::new(-1.0, 0.0));
            self.common.sfx(SfxCue::Wall);
        }
        if self.ball_pos.y - BALL_RADIUS < 0.0 && self.ball_vel.y < 0.0 {
            self.ball_pos.y = BALL_RADIUS;
            self.ball_vel = collision::reflect(self.ball_vel, Vec2::new(0.0, 1.0));
            self.common.sfx(SfxCue::Wall);
        }

        // Paddle
        let paddle = self.paddle_rect();
        if self.ball_vel.y > 0.0
            && collision::circle_overlaps_aabb(self.ball_pos, BALL_RADIUS, &paddle)
        {
            let offset = ((self.ball_pos.x - paddle.center().x) / (PADDLE_WIDTH / 2.0))
                .clamp(-1.0, 1.0);
            let angle = offset * MAX_BOUNCE_ANGLE;
            self.ball_speed = (self.ball_speed + PADDLE_SPEEDUP).min(MAX_BALL_SPEED);
            self.ball_vel = Vec2::new(angle.sin(), -angle.cos()) * self.ball_speed;
            self.ball_pos.y = PADDLE_Y - BALL_RADIUS;
            self.common.sfx(SfxCue::Paddle);
        }

        // Bricks: one per tick, deflect vertically
        if let Some(idx) = self
            .bricks
            .iter()
            .position(|b| collision::circle_overlaps_aabb(self.ball_pos, BALL_RADIUS, &b.rect))
        {
            let brick = self.bricks.swap_remove(idx);
            self.ball_vel.y = -self.ball_vel.y;
            self.common.add_score(10 * self.level as u64);
            self.common.sfx(SfxCue::Brick);
            let color = row_color(brick.row);
            self.common
                .fx
                .spawn_burst(brick.rect.center(), 25, 1.0..6.0, color, &mut self.common.rng);

            if self.bricks.is_empty() {
                if (self.level as usize) < LEVELS.len() {
                    self.common.sfx(SfxCue::LevelClear);
                    self.common.events.push(GameEvent::LevelClear);
                } else {
                    self.common.sfx(SfxCue::Win);
                    self.common.alive = false;
                    self.common.events.push(GameEvent::Won);
                }
            }
        }

        // Past the paddle
        if self.ball_pos.y - BALL_RADIUS > HEIGHT {
            self.common
                .fx
                .spawn_burst(self.ball_pos, 30, 2.0..7.0, [1.0, 0.3, 0.3], &mut self.common.rng);
            self.common.sfx(SfxCue::Crash);
            self.common.kill();
        }

        self.common.fx.advance(dt);
    }
}

/// Brick tint cycles by row.
pub fn row_color(row: usize) -> [f32; 3] {
    const COLORS: [[f32; 3]; 4] = [
        [1.0, 0.2, 0.6],
        [0.2, 0.9, 1.0],
        [0.7, 0.4, 1.0],
        [0.3, 1.0, 0.5],
    ];
    COLORS[row % COLORS.len()]
}
