//! Geo Dash: auto-running cube, one-button jump, spike and block patterns.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::Rng;

use super::collision::Aabb;
use super::{SimCommon, TickInput};
use crate::audio::SfxCue;
use crate::fx::Particle;

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 450.0;
pub const GROUND_Y: f32 = HEIGHT - 60.0;

pub const PLAYER_SIZE: f32 = 40.0;
pub const PLAYER_X: f32 = 150.0;
/// The lethal box is 4 px smaller than the sprite
const PLAYER_MARGIN: f32 = 2.0;

const GRAVITY: f32 = 0.7;
const JUMP_VELOCITY: f32 = -13.0;
const TERMINAL_FALL: f32 = 15.0;
const ROTATION_PER_FRAME: f32 = 0.12;

pub const BASE_SPEED: f32 = 8.0;
const MAX_SPEED: f32 = 15.0;
const SPEED_PER_FRAME: f32 = 0.001;

/// Spikes forgive more than blocks
const SPIKE_MARGIN: Vec2 = Vec2::new(11.0, 6.0);
const BLOCK_MARGIN: Vec2 = Vec2::new(6.0, 6.0);
/// Falling onto a block within this much penetration (plus the frame's fall
/// distance) is a landing, anything deeper is a faceplant
const LANDING_TOLERANCE: f32 = 15.0;

const OBSTACLE_SIZE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Spike,
    Block,
}

#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub rect: Aabb,
}

#[derive(Debug)]
pub struct DashState {
    pub common: SimCommon,
    pub player_y: f32,
    pub vy: f32,
    pub grounded: bool,
    pub rotation: f32,
    pub speed: f32,
    pub obstacles: Vec<Obstacle>,
}

impl DashState {
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            common: SimCommon::new(seed),
            player_y: GROUND_Y - PLAYER_SIZE,
            vy: 0.0,
            grounded: true,
            rotation: 0.0,
            speed: BASE_SPEED,
            obstacles: Vec::new(),
        };
        state.spawn_pattern(WIDTH + 200.0);
        state
    }

    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if !self.common.alive {
            return;
        }
        self.common.frames += 1;

        if input.primary_pressed && self.grounded {
            self.vy = JUMP_VELOCITY;
            self.grounded = false;
            self.common.sfx(SfxCue::Jump);
        }

        self.vy = (self.vy + GRAVITY * dt).min(TERMINAL_FALL);
        self.player_y += self.vy * dt;
        self.grounded = false;

        let stand_y = GROUND_Y - PLAYER_SIZE;
        if self.player_y >= stand_y {
            self.player_y = stand_y;
            self.vy = 0.0;
            self.land();
        }

        for o in &mut self.obstacles {
            o.rect.pos.x -= self.speed * dt;
        }

        // Keep a pattern queued beyond the right edge
        let furthest = self
            .obstacles
            .iter()
            .map(|o| o.rect.right())
            .fold(0.0f32, f32::max);
        if furthest < WIDTH {
            let gap = self.common.rng.random_range(400.0..700.0);
            self.spawn_pattern(furthest.max(WIDTH) + gap);
        }

        self.resolve_collisions();
        self.obstacles.retain(|o| o.rect.right() > 0.0);

        if !self.grounded {
            self.rotation += ROTATION_PER_FRAME * dt;
        }

        if self.common.frames % 10 == 0 {
            self.common.add_score(1);
        }
        self.speed = (self.speed + SPEED_PER_FRAME * dt).min(MAX_SPEED);

        if self.common.frames % 3 == 0 {
            let rng = &mut self.common.rng;
            self.common.fx.push(Particle {
                pos: Vec2::new(PLAYER_X, self.player_y + PLAYER_SIZE * 0.8),
                vel: Vec2::new(-self.speed * 0.5, rng.random_range(-1.0..1.0)),
                life: 1.0,
                decay: 0.08,
                size: rng.random_range(2.0..4.0),
                color: [0.0, 1.0, 0.9],
                gravity: 0.0,
            });
        }
        self.common.fx.advance(dt);
    }

    pub fn player_box(&self) -> Aabb {
        Aabb::new(PLAYER_X, self.player_y, PLAYER_SIZE, PLAYER_SIZE)
    }

    fn hitbox(&self) -> Aabb {
        self.player_box().inset(PLAYER_MARGIN, PLAYER_MARGIN)
    }

    fn land(&mut self) {
        if !self.grounded {
            self.rotation = (self.rotation / FRAC_PI_2).round() * FRAC_PI_2;
        }
        self.grounded = true;
    }

    fn resolve_collisions(&mut self) {
        let hitbox = self.hitbox();
        let mut landed_on: Option<f32> = None;
        let mut died = false;

        for o in &self.obstacles {
            match o.kind {
                ObstacleKind::Spike => {
                    if hitbox.overlaps(&o.rect.inset(SPIKE_MARGIN.x, SPIKE_MARGIN.y)) {
                        died = true;
                    }
                }
                ObstacleKind::Block => {
                    if hitbox.overlaps(&o.rect.inset(BLOCK_MARGIN.x, BLOCK_MARGIN.y)) {
                        let penetration = hitbox.bottom() - o.rect.pos.y;
                        if self.vy >= 0.0 && penetration <= LANDING_TOLERANCE + self.vy {
                            landed_on = Some(o.rect.pos.y);
                        } else {
                            died = true;
                        }
                    }
                }
            }
        }

        if died {
            self.explode();
            return;
        }
        if let Some(top) = landed_on {
            self.player_y = top - PLAYER_SIZE;
            self.vy = 0.0;
            self.land();
        }
    }

    fn explode(&mut self) {
        let origin = self.player_box().center();
        self.common
            .fx
            .spawn_burst(origin, 30, 2.0..8.0, [1.0, 0.4, 0.1], &mut self.common.rng);
        self.common.sfx(SfxCue::Crash);
        self.common.kill();
    }

    /// Five fixed layouts, picked deterministically.
    fn spawn_pattern(&mut self, x: f32) {
        let spike_y = GROUND_Y - OBSTACLE_SIZE;
        let pattern = self.common.rng.random_range(0..5u32);
        let spike = |x: f32| Obstacle {
            kind: ObstacleKind::Spike,
            rect: Aabb::new(x, spike_y, OBSTACLE_SIZE, OBSTACLE_SIZE),
        };
        let block = |x: f32, h: f32| Obstacle {
            kind: ObstacleKind::Block,
            rect: Aabb::new(x, GROUND_Y - h, OBSTACLE_SIZE, h),
        };
        match pattern {
            0 => self.obstacles.push(spike(x)),
            1 => {
                self.obstacles.push(spike(x));
                self.obstacles.push(spike(x + OBSTACLE_SIZE));
            }
            2 => {
                self.obstacles.push(spike(x));
                self.obstacles.push(spike(x + OBSTACLE_SIZE));
                self.obstacles.push(spike(x + OBSTACLE_SIZE * 2.0));
            }
            3 => {
                self.obstacles.push(block(x, OBSTACLE_SIZE));
                self.obstacles.push(spike(x + OBSTACLE_SIZE + 80.0));
            }
            _ => {
                self.obstacles.push(block(x, OBSTACLE_SIZE * 2.0));
                self.obstacles.push(block(x + OBSTACLE_SIZE, OBSTACLE_SIZE * 2.0));
            }
        }
    }
}
