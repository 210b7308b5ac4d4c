//! Neon Snake: fixed 20x20 grid, stepped on a shrinking millisecond
//! interval rather than every frame.

use glam::{IVec2, Vec2};
use rand::Rng;

use super::{SimCommon, TickInput};
use crate::audio::SfxCue;
use crate::consts::FRAME_MS;

pub const GRID: i32 = 20;
pub const TILE: f32 = 30.0;

pub const BASE_INTERVAL_MS: f32 = 200.0;
const MIN_INTERVAL_MS: f32 = 50.0;
const INTERVAL_STEP_MS: f32 = 2.0;

const START_LENGTH: usize = 3;

#[derive(Debug)]
pub struct SnakeState {
    pub common: SimCommon,
    /// Head first
    pub body: Vec<IVec2>,
    pub dir: IVec2,
    queued_dir: IVec2,
    pub food: IVec2,
    pub interval_ms: f32,
    timer_ms: f32,
}

impl SnakeState {
    pub fn new(seed: u64) -> Self {
        let mid = GRID / 2;
        let body: Vec<IVec2> = (0..START_LENGTH as i32)
            .map(|i| IVec2::new(mid - i, mid))
            .collect();
        let mut state = Self {
            common: SimCommon::new(seed),
            body,
            dir: IVec2::new(1, 0),
            queued_dir: IVec2::new(1, 0),
            food: IVec2::ZERO,
            interval_ms: BASE_INTERVAL_MS,
            timer_ms: 0.0,
        };
        state.food = state.free_cell();
        state
    }

    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if !self.common.alive {
            return;
        }
        self.common.frames += 1;

        let wanted = if input.up_pressed {
            Some(IVec2::new(0, -1))
        } else if input.down_pressed {
            Some(IVec2::new(0, 1))
        } else if input.left_pressed {
            Some(IVec2::new(-1, 0))
        } else if input.right_pressed {
            Some(IVec2::new(1, 0))
        } else {
            None
        };
        // Reversing into yourself is ignored, not fatal
        if let Some(d) = wanted {
            if d != -self.dir {
                self.queued_dir = d;
            }
        }

        self.timer_ms += dt * FRAME_MS;
        while self.timer_ms >= self.interval_ms && self.common.alive {
            self.timer_ms -= self.interval_ms;
            self.step();
        }
        self.common.fx.advance(dt);
    }

    fn step(&mut self) {
        self.dir = self.queued_dir;
        let head = self.body[0] + self.dir;

        if head.x < 0 || head.x >= GRID || head.y < 0 || head.y >= GRID {
            self.die(head);
            return;
        }

        let eating = head == self.food;
        if !eating {
            self.body.pop();
        }
        if self.body.contains(&head) {
            self.die(head);
            return;
        }
        self.body.insert(0, head);

        if eating {
            self.common.add_score(10);
            self.common.sfx(SfxCue::Eat);
            let origin = cell_center(self.food);
            self.common
                .fx
                .spawn_burst(origin, 15, 1.0..4.0, [0.3, 1.0, 0.4], &mut self.common.rng);
            self.interval_ms = (self.interval_ms - INTERVAL_STEP_MS).max(MIN_INTERVAL_MS);
            self.food = self.free_cell();
        }
    }

    fn die(&mut self, at: IVec2) {
        let origin = cell_center(at.clamp(IVec2::ZERO, IVec2::splat(GRID - 1)));
        self.common
            .fx
            .spawn_burst(origin, 30, 2.0..7.0, [0.3, 1.0, 0.4], &mut self.common.rng);
        self.common.sfx(SfxCue::Crash);
        self.common.kill();
    }

    fn free_cell(&mut self) -> IVec2 {
        loop {
            let cell = IVec2::new(
                self.common.rng.random_range(0..GRID),
                self.common.rng.random_range(0..GRID),
            );
            if !self.body.contains(&cell) {
                return cell;
            }
        }
    }
}

pub fn cell_center(cell: IVec2) -> Vec2 {
    Vec2::new(
        cell.x as f32 * TILE + TILE / 2.0,
        cell.y as f32 * TILE + TILE / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameEvent;

    /// Frames needed to accumulate one step at the current interval
    fn frames_per_step(state: &SnakeState) -> usize {
        (state.interval_ms / FRAME_MS).ceil() as usize + 1
    }

    #[test]
    fn no_movement_between_interval_steps() {
        let mut state = SnakeState::new(1);
        let head = state.body[0];
        state.tick(&TickInput::default(), 1.0);
        assert_eq!(state.body[0], head);
    }

    #[test]
    fn steps_move_one_cell() {
        let mut state = SnakeState::new(1);
        state.food = IVec2::new(0, 0);
        let head = state.body[0];
        for _ in 0..frames_per_step(&state) {
            state.tick(&TickInput::default(), 1.0);
        }
        assert_eq!(state.body[0], head + IVec2::new(1, 0));
        assert_eq!(state.body.len(), START_LENGTH);
    }

    #[test]
    fn reversal_is_ignored() {
        let mut state = SnakeState::new(1);
        state.food = IVec2::new(0, 0);
        let input = TickInput {
            left_pressed: true,
            ..Default::default()
        };
        let head = state.body[0];
        for _ in 0..frames_per_step(&state) {
            state.tick(&input, 1.0);
        }
        // Still heading right
        assert_eq!(state.body[0], head + IVec2::new(1, 0));
        assert!(state.common.alive);
    }

    #[test]
    fn eating_grows_scores_and_speeds_up() {
        let mut state = SnakeState::new(1);
        state.food = state.body[0] + IVec2::new(1, 0);
        for _ in 0..frames_per_step(&state) {
            state.tick(&TickInput::default(), 1.0);
        }
        assert_eq!(state.common.score, 10);
        assert_eq!(state.body.len(), START_LENGTH + 1);
        assert_eq!(state.interval_ms, BASE_INTERVAL_MS - INTERVAL_STEP_MS);
        assert_ne!(state.food, state.body[0]);
    }

    #[test]
    fn interval_floors_at_minimum() {
        let mut state = SnakeState::new(1);
        state.interval_ms = MIN_INTERVAL_MS + 1.0;
        state.food = state.body[0] + IVec2::new(1, 0);
        for _ in 0..frames_per_step(&state) {
            state.tick(&TickInput::default(), 1.0);
        }
        assert_eq!(state.interval_ms, MIN_INTERVAL_MS);
    }

    #[test]
    fn wall_contact_kills_once() {
        let mut state = SnakeState::new(1);
        state.food = IVec2::new(0, 0);
        state.body = vec![IVec2::new(GRID - 1, 5)];
        // A large delta spanning several steps must still die exactly once
        state.timer_ms = BASE_INTERVAL_MS * 3.0;
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
    fn running_into_the_body_kills() {
        let mut state = SnakeState::new(1);
        state.food = IVec2::new(0, 0);
        // A hook: head will turn down into its own trunk
        state.body = vec![
            IVec2::new(5, 5),
            IVec2::new(4, 5),
            IVec2::new(4, 6),
            IVec2::new(5, 6),
            IVec2::new(6, 6),
        ];
        state.dir = IVec2::new(1, 0);
        state.queued_dir = IVec2::new(0, 1);
        state.timer_ms = state.interval_ms;
        state.tick(&TickInput::default(), 1.0);
        assert!(!state.common.alive);
    }
}
