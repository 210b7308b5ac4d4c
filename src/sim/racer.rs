//! Neon Racer: three-lane traffic dodger. Lane switches are discrete, so
//! collision only considers cars sharing the player's lane.

use glam::Vec2;
use rand::Rng;

use super::{SimCommon, TickInput};
use crate::audio::SfxCue;
use crate::consts::TARGET_FPS;

pub const WIDTH: f32 = 400.0;
pub const HEIGHT: f32 = 600.0;

pub const LANES: u8 = 3;
pub const LANE_WIDTH: f32 = 120.0;
pub const ROAD_LEFT: f32 = (WIDTH - LANES as f32 * LANE_WIDTH) / 2.0;

pub const PLAYER_Y: f32 = HEIGHT - 120.0;
pub const CAR_LENGTH: f32 = 90.0;
/// Vertical proximity that counts as a collision in-lane
const COLLISION_DY: f32 = 60.0;
/// A car this far past the player has been dodged
const PASS_DY: f32 = 50.0;

pub const BASE_SPEED: f32 = 5.0;
const MAX_SPEED: f32 = 15.0;
const SPEED_PER_SECOND: f32 = 0.5;

const MAX_CRASHES: u8 = 3;
pub const CAR_COLORS: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct TrafficCar {
    pub lane: u8,
    pub y: f32,
    /// Own forward speed; the player closes at `speed - self.speed`
    pub speed: f32,
    pub color: usize,
    pub passed: bool,
}

#[derive(Debug)]
pub struct RacerState {
    pub common: SimCommon,
    pub lane: u8,
    pub speed: f32,
    pub crashes: u8,
    pub cars: Vec<TrafficCar>,
    spawn_timer: f32,
}

pub fn lane_center_x(lane: u8) -> f32 {
    ROAD_LEFT + lane as f32 * LANE_WIDTH + LANE_WIDTH * 0.5
}

impl RacerState {
    pub fn new(seed: u64) -> Self {
        Self {
            common: SimCommon::new(seed),
            lane: 1,
            speed: BASE_SPEED,
            crashes: 0,
            cars: Vec::new(),
            spawn_timer: 0.0,
        }
    }

    /// Seconds between spawns shrinks with speed but never below 0.8
    fn spawn_interval(&self) -> f32 {
        (2.0 - self.speed * 0.1).max(0.8)
    }

    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if !self.common.alive {
            return;
        }
        self.common.frames += 1;
        let seconds = dt / TARGET_FPS;

        if input.left_pressed && self.lane > 0 {
            self.lane -= 1;
        }
        if input.right_pressed && self.lane < LANES - 1 {
            self.lane += 1;
        }

        self.spawn_timer += seconds;
        if self.spawn_timer >= self.spawn_interval() {
            self.spawn_timer = 0.0;
            let lane = self.common.rng.random_range(0..LANES);
            let speed = self.common.rng.random_range(3.0..5.0);
            let color = self.common.rng.random_range(0..CAR_COLORS);
            self.cars.push(TrafficCar {
                lane,
                y: -CAR_LENGTH,
                speed,
                color,
                passed: false,
            });
        }

        for car in &mut self.cars {
            car.y += (self.speed - car.speed) * dt;
        }

        // Crashes: in-lane proximity only
        let mut crashed_at: Option<f32> = None;
        self.cars.retain(|car| {
            let hit = crashed_at.is_none()
                && car.lane == self.lane
                && (car.y - PLAYER_Y).abs() < COLLISION_DY;
            if hit {
                crashed_at = Some(car.y);
            }
            !hit
        });
        if let Some(y) = crashed_at {
            self.crashes += 1;
            let origin = Vec2::new(lane_center_x(self.lane), y);
            self.common
                .fx
                .spawn_burst(origin, 30, 2.0..8.0, [1.0, 0.2, 0.2], &mut self.common.rng);
            self.common.sfx(SfxCue::Crash);
            if self.crashes >= MAX_CRASHES {
                self.common.kill();
            }
        }

        // Dodged cars score once each
        let mut passes = 0;
        for car in &mut self.cars {
            if !car.passed && car.y > PLAYER_Y + PASS_DY {
                car.passed = true;
                passes += 1;
            }
        }
        for _ in 0..passes {
            self.common.add_score(10);
            self.common.sfx(SfxCue::Score);
        }
        self.cars.retain(|c| c.y < HEIGHT + CAR_LENGTH);

        self.speed = (self.speed + SPEED_PER_SECOND * seconds).min(MAX_SPEED);
        self.common.fx.advance(dt);
    }
}
