//! Particle effects.
//!
//! Every game owns one `ParticleSystem`: trails, pickup bursts, explosions.
//! Particles are cosmetic only and never feed back into gameplay, so the
//! pool is hard-capped and overflow evicts the oldest entries.

use glam::Vec2;
use rand::Rng;

use crate::consts::MAX_PARTICLES;
use crate::sim::rng::SimRng;

/// One short-lived particle. `life` runs 1.0 -> 0.0.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    /// Life lost per normalized frame
    pub decay: f32,
    pub size: f32,
    pub color: [f32; 3],
    pub gravity: f32,
}

#[derive(Debug, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Scatter `count` particles from `origin` in random directions.
    pub fn spawn_burst(
        &mut self,
        origin: Vec2,
        count: usize,
        speed: std::ops::Range<f32>,
        color: [f32; 3],
        rng: &mut SimRng,
    ) {
        for _ in 0..count {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let magnitude = rng.random_range(speed.clone());
            self.push(Particle {
                pos: origin,
                vel: Vec2::new(angle.cos(), angle.sin()) * magnitude,
                life: 1.0,
                decay: rng.random_range(0.02..0.05),
                size: rng.random_range(2.0..5.0),
                color,
                gravity: 0.0,
            });
        }
    }

    /// Spawn a single particle with explicit parameters (trails, puffs).
    pub fn push(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Integrate one frame: drag, optional gravity, life decay, then drop
    /// everything that reached the end of its life.
    pub fn advance(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.vel *= 0.98f32.powf(dt);
            p.vel.y += p.gravity * dt;
            p.pos += p.vel * dt;
            p.life -= p.decay * dt;
        }
        self.particles.retain(|p| p.life > 0.0);
    }
}
