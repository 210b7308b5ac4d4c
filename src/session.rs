//! One play session: phase machine, frame driving, music scheduling, and
//! the at-most-once score submission per run.

use crate::audio::{MusicSequencer, NoteEvent};
use crate::clock::FrameClock;
use crate::sim::{GameEvent, GameKind, GamePhase, GameSim, TickInput};

/// A finished run's score, to be sent to the score service exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub game_id: &'static str,
    pub score: u64,
}

/// Everything one frame produced for the platform layer.
#[derive(Debug, Default)]
pub struct FrameOutput {
    pub events: Vec<GameEvent>,
    pub notes: Vec<NoteEvent>,
    pub submission: Option<ScoreSubmission>,
}

pub struct Session {
    kind: GameKind,
    phase: GamePhase,
    sim: GameSim,
    clock: FrameClock,
    sequencer: MusicSequencer,
    submitted: bool,
}

impl Session {
    pub fn new(kind: GameKind, seed: u64) -> Self {
        Self {
            kind,
            phase: GamePhase::Menu,
            sim: GameSim::new(kind, seed),
            clock: FrameClock::new(),
            sequencer: MusicSequencer::new(),
            submitted: false,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn sim(&self) -> &GameSim {
        &self.sim
    }

    pub fn score(&self) -> u64 {
        self.sim.score()
    }

    /// Enter PLAYING. From LEVEL_CLEAR this continues the run on the next
    /// tier, keeping score; from anywhere else it starts a fresh run with
    /// `seed`. A no-op while already playing.
    pub fn start(&mut self, seed: u64) {
        match self.phase {
            GamePhase::Playing => return,
            GamePhase::LevelClear => {
                self.sim.advance_tier();
            }
            _ => {
                self.sim = GameSim::new(self.kind, seed);
                self.submitted = false;
                self.sequencer.reset();
            }
        }
        self.clock.reset();
        self.phase = GamePhase::Playing;
    }

    /// Back to the menu (quit/escape). Keeps the last sim for the backdrop.
    pub fn to_menu(&mut self) {
        if self.phase != GamePhase::Playing {
            self.phase = GamePhase::Menu;
        }
    }

    /// Drive one animation frame. Outside PLAYING nothing advances and no
    /// music is scheduled.
    pub fn frame(&mut self, now_ms: f64, input: &TickInput, audio_now: f64) -> FrameOutput {
        if self.phase != GamePhase::Playing {
            return FrameOutput::default();
        }

        let dt = self.clock.tick(now_ms);
        self.sim.tick(input, dt);
        let events = self.sim.drain_events();

        for event in &events {
            match event {
                GameEvent::Died => {
                    log::debug!("{} run over, score {}", self.kind.id(), self.sim.score());
                    self.phase = GamePhase::GameOver;
                }
                GameEvent::LevelClear => self.phase = GamePhase::LevelClear,
                GameEvent::Won => self.phase = GamePhase::Won,
                _ => {}
            }
        }

        let submission = match self.phase {
            GamePhase::GameOver | GamePhase::Won if !self.submitted => {
                self.submitted = true;
                Some(ScoreSubmission {
                    game_id: self.kind.id(),
                    score: self.sim.score(),
                })
            }
            _ => None,
        };

        let notes = self.sequencer.advance(audio_now, self.sim.difficulty());

        FrameOutput {
            events,
            notes,
            submission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::breaker;

    fn playing(kind: GameKind) -> Session {
        let mut session = Session::new(kind, 7);
        session.start(7);
        session
    }

    /// Force the current run to its lethal end on the next frame.
    fn doom(session: &mut Session) {
        match &mut session.sim {
            GameSim::Flappy(s) => {
                s.pipes.clear();
                s.bird_y = -100.0;
            }
            GameSim::Breaker(s) => {
                s.launched = true;
                s.bricks.clear();
                s.ball_pos = glam::Vec2::new(400.0, breaker::HEIGHT + 50.0);
                s.ball_vel = glam::Vec2::new(0.0, 5.0);
            }
            _ => panic!("unsupported in this test"),
        }
    }

    #[test]
    fn starts_in_the_menu_and_menu_frames_are_inert() {
        let mut session = Session::new(GameKind::Flappy, 1);
        assert_eq!(session.phase(), GamePhase::Menu);
        let out = session.frame(100.0, &TickInput::default(), 0.0);
        assert!(out.events.is_empty());
        assert!(out.notes.is_empty());
        assert_eq!(session.phase(), GamePhase::Menu);
    }

    #[test]
    fn death_moves_to_game_over_and_submits_once() {
        let mut session = playing(GameKind::Flappy);
        doom(&mut session);
        let out = session.frame(16.0, &TickInput::default(), 0.016);
        assert_eq!(session.phase(), GamePhase::GameOver);
        let submission = out.submission.expect("terminal frame submits");
        assert_eq!(submission.game_id, "flappy-neon");

        // Further frames are inert and never submit again
        let out = session.frame(32.0, &TickInput::default(), 0.032);
        assert!(out.submission.is_none());
        assert_eq!(session.phase(), GamePhase::GameOver);
    }

    #[test]
    fn restart_from_game_over_resets_the_run() {
        let mut session = playing(GameKind::Flappy);
        doom(&mut session);
        session.frame(16.0, &TickInput::default(), 0.016);
        session.start(99);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.score(), 0);
        assert!(session.sim().common().alive);
    }

    #[test]
    fn level_clear_continues_with_score_kept() {
        let mut session = playing(GameKind::Breaker);
        // Leave one brick and drive the ball through it
        let GameSim::Breaker(s) = &mut session.sim else {
            unreachable!()
        };
        s.launched = true;
        s.common.score = 120;
        let keep = s.bricks[0];
        s.bricks.clear();
        s.bricks.push(keep);
        s.ball_pos = keep.rect.center();
        s.ball_vel = glam::Vec2::new(0.0, -1.0);

        let out = session.frame(16.0, &TickInput::default(), 0.016);
        assert_eq!(session.phase(), GamePhase::LevelClear);
        assert!(out.submission.is_none(), "clears are not terminal");

        let score_after_clear = session.score();
        session.start(1);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.score(), score_after_clear);
        let GameSim::Breaker(s) = session.sim() else {
            unreachable!()
        };
        assert_eq!(s.level, 2);
    }

    #[test]
    fn playing_frames_schedule_music() {
        let mut session = playing(GameKind::Snake);
        let out = session.frame(16.0, &TickInput::default(), 0.5);
        assert!(!out.notes.is_empty());
    }

    #[test]
    fn start_while_playing_is_ignored() {
        let mut session = playing(GameKind::Snake);
        session.frame(16.0, &TickInput::default(), 0.0);
        let frames = session.sim().common().frames;
        session.start(123);
        assert_eq!(session.sim().common().frames, frames);
    }

    #[test]
    fn menu_never_jumps_straight_to_game_over() {
        let mut session = Session::new(GameKind::Flappy, 1);
        doom(&mut session);
        // Menu frames don't tick the sim, so the doomed state never lands
        session.frame(16.0, &TickInput::default(), 0.0);
        assert_eq!(session.phase(), GamePhase::Menu);
    }
}
