//! Neon Arcade - six small neon-styled browser games on one engine
//!
//! Core modules:
//! - `clock`: Frame clock normalizing raw timestamps to a 60 Hz-relative delta
//! - `sim`: Deterministic per-game simulations (physics, collisions, scoring)
//! - `fx`: Shared particle system
//! - `audio`: Lookahead music sequencer and sound cue definitions
//! - `session`: Game phase machine driving one play session
//! - `scores`: Async score service client (keep-maximum, deduped leaderboard)
//! - `render`: Canvas 2D drawing (wasm only)

pub mod audio;
pub mod clock;
pub mod fx;
pub mod scores;
pub mod session;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod render;

pub use clock::FrameClock;
pub use session::Session;
pub use settings::Settings;
pub use sim::{GameKind, GamePhase};

/// Engine-wide constants
pub mod consts {
    /// Simulation target frame rate; a delta of 1.0 means one 60 Hz frame
    pub const TARGET_FPS: f32 = 60.0;
    /// Duration of one target frame in milliseconds
    pub const FRAME_MS: f32 = 1000.0 / TARGET_FPS;
    /// Upper clamp on the normalized frame delta (3 frames ≈ 50 ms)
    pub const MAX_FRAME_DELTA: f32 = 3.0;

    /// Particle pool hard cap across all emitters of one game
    pub const MAX_PARTICLES: usize = 512;

    /// How far ahead of the audio clock the sequencer schedules notes (seconds)
    pub const AUDIO_LOOKAHEAD: f64 = 0.1;
    /// Cursor lag beyond which the sequencer snaps forward instead of
    /// bursting every missed step
    pub const AUDIO_RESYNC_SLACK: f64 = 0.5;
}
