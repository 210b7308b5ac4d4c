//! Deterministic game simulations.
//!
//! Each game is a plain state struct advanced by an explicit `tick` with a
//! normalized frame delta. Side effects are confined to the state itself,
//! its particle pool, and an event queue the session drains once per frame.
//! No platform types appear below this module; everything here runs (and is
//! tested) natively.

pub mod breaker;
pub mod collision;
pub mod dash;
pub mod flappy;
pub mod racer;
pub mod rng;
pub mod shooter;
pub mod snake;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::audio::SfxCue;
use crate::fx::ParticleSystem;
use rng::SimRng;

/// The six games. Closed set: adding a game means adding a variant and its
/// module, and the compiler walks every dispatch site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    Dash,
    Flappy,
    Racer,
    Breaker,
    Shooter,
    Snake,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::Dash,
        GameKind::Flappy,
        GameKind::Racer,
        GameKind::Breaker,
        GameKind::Shooter,
        GameKind::Snake,
    ];

    /// Stable identifier used by the score service and page routing.
    pub fn id(self) -> &'static str {
        match self {
            GameKind::Dash => "geodash",
            GameKind::Flappy => "flappy-neon",
            GameKind::Racer => "neon-racer",
            GameKind::Breaker => "cyber-breaker",
            GameKind::Shooter => "neon-shooter",
            GameKind::Snake => "snake",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameKind::Dash => "Geo Dash",
            GameKind::Flappy => "Flappy Neon",
            GameKind::Racer => "Neon Racer",
            GameKind::Breaker => "Cyber Breaker",
            GameKind::Shooter => "Neon Shooter",
            GameKind::Snake => "Neon Snake",
        }
    }

    pub fn from_id(id: &str) -> Option<GameKind> {
        GameKind::ALL.iter().copied().find(|k| k.id() == id)
    }
}

/// Session phase. Transitions are driven by `Session`; sims only report
/// terminal events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Menu,
    Playing,
    GameOver,
    LevelClear,
    Won,
}

/// Input snapshot for one tick. `*_pressed` flags are edges, cleared by the
/// platform layer after each frame; the rest are held state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire button held (shooter)
    pub primary: bool,
    /// Fire/jump/flap edge
    pub primary_pressed: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub up_pressed: bool,
    pub down_pressed: bool,
    /// Pointer position in game-surface coordinates
    pub pointer: Vec2,
}

/// What a tick produced, drained by the session after the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Sfx(SfxCue),
    /// Points just added (already applied to the running score)
    Scored(u64),
    Died,
    LevelClear,
    Won,
}

/// State every game shares: running score, frame counter, event queue,
/// particle pool, seeded RNG, and the alive guard that makes death fire once.
#[derive(Debug)]
pub struct SimCommon {
    pub score: u64,
    pub frames: u64,
    pub alive: bool,
    pub events: Vec<GameEvent>,
    pub fx: ParticleSystem,
    pub rng: SimRng,
}

impl SimCommon {
    pub fn new(seed: u64) -> Self {
        Self {
            score: 0,
            frames: 0,
            alive: true,
            events: Vec::new(),
            fx: ParticleSystem::new(),
            rng: SimRng::seed_from(seed),
        }
    }

    pub fn add_score(&mut self, points: u64) {
        self.score += points;
        self.events.push(GameEvent::Scored(points));
    }

    pub fn sfx(&mut self, cue: SfxCue) {
        self.events.push(GameEvent::Sfx(cue));
    }

    /// Mark the run over. Repeated lethal contacts in the same tick emit a
    /// single `Died`.
    pub fn kill(&mut self) {
        if self.alive {
            self.alive = false;
            self.events.push(GameEvent::Died);
        }
    }
}

/// One running game, tagged by kind.
#[derive(Debug)]
pub enum GameSim {
    Dash(dash::DashState),
    Flappy(flappy::FlappyState),
    Racer(racer::RacerState),
    Breaker(breaker::BreakerState),
    Shooter(shooter::ShooterState),
    Snake(snake::SnakeState),
}

impl GameSim {
    pub fn new(kind: GameKind, seed: u64) -> Self {
        match kind {
            GameKind::Dash => GameSim::Dash(dash::DashState::new(seed)),
            GameKind::Flappy => GameSim::Flappy(flappy::FlappyState::new(seed)),
            GameKind::Racer => GameSim::Racer(racer::RacerState::new(seed)),
            GameKind::Breaker => GameSim::Breaker(breaker::BreakerState::new(seed)),
            GameKind::Shooter => GameSim::Shooter(shooter::ShooterState::new(seed)),
            GameKind::Snake => GameSim::Snake(snake::SnakeState::new(seed)),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            GameSim::Dash(_) => GameKind::Dash,
            GameSim::Flappy(_) => GameKind::Flappy,
            GameSim::Racer(_) => GameKind::Racer,
            GameSim::Breaker(_) => GameKind::Breaker,
            GameSim::Shooter(_) => GameKind::Shooter,
            GameSim::Snake(_) => GameKind::Snake,
        }
    }

    /// Advance one frame. A sim whose run already ended ignores the tick.
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        match self {
            GameSim::Dash(s) => s.tick(input, dt),
            GameSim::Flappy(s) => s.tick(input, dt),
            GameSim::Racer(s) => s.tick(input, dt),
            GameSim::Breaker(s) => s.tick(input, dt),
            GameSim::Shooter(s) => s.tick(input, dt),
            GameSim::Snake(s) => s.tick(input, dt),
        }
    }

    /// Advance to the next level/stage after a clear, keeping score.
    /// Games without tiers rebuild nothing here.
    pub fn advance_tier(&mut self) {
        match self {
            GameSim::Breaker(s) => s.advance_level(),
            GameSim::Shooter(s) => s.advance_stage(),
            _ => {}
        }
    }

    pub fn common(&self) -> &SimCommon {
        match self {
            GameSim::Dash(s) => &s.common,
            GameSim::Flappy(s) => &s.common,
            GameSim::Racer(s) => &s.common,
            GameSim::Breaker(s) => &s.common,
            GameSim::Shooter(s) => &s.common,
            GameSim::Snake(s) => &s.common,
        }
    }

    fn common_mut(&mut self) -> &mut SimCommon {
        match self {
            GameSim::Dash(s) => &mut s.common,
            GameSim::Flappy(s) => &mut s.common,
            GameSim::Racer(s) => &mut s.common,
            GameSim::Breaker(s) => &mut s.common,
            GameSim::Shooter(s) => &mut s.common,
            GameSim::Snake(s) => &mut s.common,
        }
    }

    pub fn score(&self) -> u64 {
        self.common().score
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.common().fx
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.common_mut().events)
    }

    /// Difficulty scalar for music tempo: 0 at the start of a run, rising
    /// with each game's own speed/level/stage progression.
    pub fn difficulty(&self) -> f32 {
        match self {
            GameSim::Dash(s) => s.speed - dash::BASE_SPEED,
            GameSim::Flappy(s) => (s.speed - flappy::BASE_SPEED) * 3.0,
            GameSim::Racer(s) => s.speed - racer::BASE_SPEED,
            GameSim::Breaker(s) => {
                (s.level as f32 - 1.0) * 2.0 + s.ball_speed - s.base_ball_speed
            }
            GameSim::Shooter(s) => (s.stage as f32 - 1.0) * 2.0,
            GameSim::Snake(s) => (snake::BASE_INTERVAL_MS - s.interval_ms) / 15.0,
        }
    }
}
