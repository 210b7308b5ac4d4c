//! Flappy Neon: gravity bird, tap to flap, scrolling pipe gaps.

use glam::Vec2;
use rand::Rng;

use super::collision::Aabb;
use super::{SimCommon, TickInput};
use crate::audio::SfxCue;

pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 600.0;

pub const BIRD_SIZE: f32 = 40.0;
pub const BIRD_X: f32 = 150.0;
/// Lethal box forgiveness on every side
const BIRD_MARGIN: f32 = 5.0;

const GRAVITY: f32 = 0.35;
const FLAP_VELOCITY: f32 = -8.5;

pub const PIPE_WIDTH: f32 = 80.0;
pub const PIPE_GAP: f32 = 200.0;
/// A new pipe enters once the newest crosses this line
const SPAWN_X: f32 = WIDTH - 300.0;

pub const BASE_SPEED: f32 = 1.5;
const MAX_SPEED: f32 = 3.5;
const SPEED_PER_PIPE: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct Pipe {
    pub x: f32,
    /// Top of the gap
    pub gap_y: f32,
    pub passed: bool,
}

impl Pipe {
    pub fn top_rect(&self) -> Aabb {
        Aabb::new(self.x, 0.0, PIPE_WIDTH, self.gap_y)
    }

    pub fn bottom_rect(&self) -> Aabb {
        let bottom_top = self.gap_y + PIPE_GAP;
        Aabb::new(self.x, bottom_top, PIPE_WIDTH, HEIGHT - bottom_top)
    }
}

#[derive(Debug)]
pub struct FlappyState {
    pub common: SimCommon,
    pub bird_y: f32,
    pub vy: f32,
    pub speed: f32,
    pub pipes: Vec<Pipe>,
}

impl FlappyState {
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            common: SimCommon::new(seed),
            bird_y: HEIGHT * 0.5 - BIRD_SIZE * 0.5,
            vy: 0.0,
            speed: BASE_SPEED,
            pipes: Vec::new(),
        };
        state.spawn_pipe(WIDTH + 100.0);
        state
    }

    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if !self.common.alive {
            return;
        }
        self.common.frames += 1;

        if input.primary_pressed {
            self.vy = FLAP_VELOCITY;
            self.common.sfx(SfxCue::Flap);
            let origin = Vec2::new(BIRD_X + BIRD_SIZE * 0.2, self.bird_y + BIRD_SIZE);
            self.common
                .fx
                .spawn_burst(origin, 8, 0.5..2.0, [0.4, 0.9, 1.0], &mut self.common.rng);
        }

        self.vy += GRAVITY * dt;
        self.bird_y += self.vy * dt;

        for pipe in &mut self.pipes {
            pipe.x -= self.speed * dt;
        }

        let newest_x = self.pipes.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        if newest_x < SPAWN_X {
            self.spawn_pipe(WIDTH);
        }

        // Pass detection before culling, so a fast frame can't skip a point
        let bird_right = BIRD_X + BIRD_SIZE;
        let mut passes = 0;
        for pipe in &mut self.pipes {
            if !pipe.passed && pipe.x + PIPE_WIDTH < bird_right {
                pipe.passed = true;
                passes += 1;
            }
        }
        for _ in 0..passes {
            self.common.add_score(1);
            self.common.sfx(SfxCue::Score);
            self.speed = (self.speed + SPEED_PER_PIPE).min(MAX_SPEED);
            let origin = Vec2::new(BIRD_X + BIRD_SIZE * 0.5, self.bird_y + BIRD_SIZE * 0.5);
            self.common
                .fx
                .spawn_burst(origin, 20, 1.0..4.0, [1.0, 0.85, 0.2], &mut self.common.rng);
        }
        self.pipes.retain(|p| p.x + PIPE_WIDTH > 0.0);

        self.resolve_collisions();
        self.common.fx.advance(dt);
    }

    pub fn bird_box(&self) -> Aabb {
        Aabb::new(BIRD_X, self.bird_y, BIRD_SIZE, BIRD_SIZE)
    }

    fn resolve_collisions(&mut self) {
        let hitbox = self.bird_box().inset(BIRD_MARGIN, BIRD_MARGIN);

        let mut died = hitbox.pos.y <= 0.0 || hitbox.bottom() >= HEIGHT;
        for pipe in &self.pipes {
            if hitbox.overlaps(&pipe.top_rect()) || hitbox.overlaps(&pipe.bottom_rect()) {
                died = true;
            }
        }
        if died {
            let origin = self.bird_box().center();
            self.common
                .fx
                .spawn_burst(origin, 50, 2.0..9.0, [1.0, 0.3, 0.6], &mut self.common.rng);
            self.common.sfx(SfxCue::Crash);
            self.common.kill();
        }
    }

    fn spawn_pipe(&mut self, x: f32) {
        let gap_y = self.common.rng.random_range(100.0..HEIGHT - 300.0);
        self.pipes.push(Pipe {
            x,
            gap_y,
            passed: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameEvent;

    #[test]
    fn flap_sets_upward_velocity() {
        let mut state = FlappyState::new(1);
        let flap = TickInput {
            primary_pressed: true,
            ..Default::default()
        };
        state.tick(&flap, 1.0);
        assert_eq!(state.vy, FLAP_VELOCITY + GRAVITY);
    }

    #[test]
    fn gravity_pulls_the_bird_down() {
        let mut state = FlappyState::new(1);
        state.pipes.clear();
        let y0 = state.bird_y;
        state.tick(&TickInput::default(), 1.0);
        state.tick(&TickInput::default(), 1.0);
        assert!(state.bird_y > y0);
    }

    #[test]
    fn passing_a_pipe_scores_and_accelerates() {
        let mut state = FlappyState::new(1);
        state.pipes.clear();
        state.pipes.push(Pipe {
            x: BIRD_X + BIRD_SIZE - PIPE_WIDTH + 0.5,
            gap_y: state.bird_y - 50.0,
            passed: false,
        });
        state.tick(&TickInput::default(), 1.0);
        assert_eq!(state.common.score, 1);
        assert_eq!(state.speed, BASE_SPEED + SPEED_PER_PIPE);
        // Already-passed pipes never score twice
        state.bird_y = HEIGHT * 0.5;
        state.tick(&TickInput::default(), 1.0);
        assert_eq!(state.common.score, 1);
    }

    #[test]
    fn floor_contact_kills_once() {
        let mut state = FlappyState::new(1);
        state.pipes.clear();
        state.bird_y = HEIGHT - BIRD_SIZE + 10.0;
        state.vy = 5.0;
        state.tick(&TickInput::default(), 1.0);
        assert!(!state.common.alive);
        let deaths = state
            .common
            .events
            .iter()
            .filter(|e| **e == GameEvent::Died)
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn pipe_gap_is_safe() {
        let mut state = FlappyState::new(1);
        state.pipes.clear();
        let gap_y = 200.0;
        state.bird_y = gap_y + PIPE_GAP * 0.5 - BIRD_SIZE * 0.5;
        state.vy = 0.0;
        state.pipes.push(Pipe {
            x: BIRD_X,
            gap_y,
            passed: true,
        });
        state.tick(&TickInput::default(), 1.0);
        assert!(state.common.alive);
    }

    #[test]
    fn hitting_a_pipe_kills() {
        let mut state = FlappyState::new(1);
        state.pipes.clear();
        state.bird_y = 50.0;
        state.pipes.push(Pipe {
            x: BIRD_X,
            gap_y: 300.0,
            passed: true,
        });
        state.tick(&TickInput::default(), 1.0);
        assert!(!state.common.alive);
    }

    #[test]
    fn speed_caps() {
        let mut state = FlappyState::new(1);
        state.speed = MAX_SPEED;
        state.pipes.clear();
        state.pipes.push(Pipe {
            x: BIRD_X - PIPE_WIDTH - 1.0,
            gap_y: 100.0,
            passed: false,
        });
        state.bird_y = HEIGHT * 0.5;
        state.vy = -1.0;
        state.tick(&TickInput::default(), 1.0);
        assert_eq!(state.speed, MAX_SPEED);
    }
}
