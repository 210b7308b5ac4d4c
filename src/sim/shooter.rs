//! Neon Shooter: top-down arena, WASD movement, pointer aim, staged waves.
//! Clearing a wave restocks a bigger one; score and health carry across.

use glam::Vec2;
use rand::Rng;

use super::collision::{self, Aabb};
use super::{GameEvent, SimCommon, TickInput};
use crate::audio::SfxCue;
use crate::consts::TARGET_FPS;

pub const WIDTH: f32 = 900.0;
pub const HEIGHT: f32 = 600.0;

pub const PLAYER_RADIUS: f32 = 16.0;
const PLAYER_SPEED: f32 = 200.0;
pub const MAX_HEALTH: i32 = 100;
const BULLET_DAMAGE: i32 = 10;

pub const MAGAZINE: u32 = 30;
const RELOAD_SECONDS: f32 = 2.0;

const BULLET_SPEED: f32 = 900.0;
const BULLET_LIFE: f32 = 1.0;
const ENEMY_BULLET_SPEED: f32 = 300.0;

pub const ENEMY_RADIUS: f32 = 18.0;
const ENEMY_SPEED: f32 = 70.0;
/// Enemies hold position once this close
const ENEMY_STANDOFF: f32 = 200.0;
const ENEMY_FIRE_RANGE: f32 = 400.0;
const ENEMY_SPREAD: f32 = 0.15;

/// Fixed cover layout, symmetric about the arena center.
pub const COVER: [Aabb; 6] = [
    Aabb { pos: Vec2::new(150.0, 120.0), size: Vec2::new(80.0, 80.0) },
    Aabb { pos: Vec2::new(670.0, 120.0), size: Vec2::new(80.0, 80.0) },
    Aabb { pos: Vec2::new(150.0, 400.0), size: Vec2::new(80.0, 80.0) },
    Aabb { pos: Vec2::new(670.0, 400.0), size: Vec2::new(80.0, 80.0) },
    Aabb { pos: Vec2::new(390.0, 80.0), size: Vec2::new(120.0, 50.0) },
    Aabb { pos: Vec2::new(390.0, 470.0), size: Vec2::new(120.0, 50.0) },
];

#[derive(Debug, Clone, Copy)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining flight time in seconds
    pub life: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Enemy {
    pub pos: Vec2,
    pub hp: i32,
    shoot_timer: f32,
}

#[derive(Debug)]
pub struct ShooterState {
    pub common: SimCommon,
    pub stage: u32,
    pub pos: Vec2,
    pub aim: Vec2,
    pub health: i32,
    pub ammo: u32,
    pub reload_timer: f32,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
}

impl ShooterState {
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            common: SimCommon::new(seed),
            stage: 1,
            pos: Vec2::new(WIDTH / 2.0, HEIGHT / 2.0),
            aim: Vec2::new(1.0, 0.0),
            health: MAX_HEALTH,
            ammo: MAGAZINE,
            reload_timer: 0.0,
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            enemies: Vec::new(),
        };
        state.spawn_wave();
        state
    }

    /// Next wave after a clear; health, ammo and score carry over.
    pub fn advance_stage(&mut self) {
        self.stage += 1;
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.spawn_wave();
    }

    pub fn enemy_count_for_stage(stage: u32) -> usize {
        3 + stage as usize
    }

    fn enemy_fire_interval(&self) -> f32 {
        (3.0 - self.stage as f32 * 0.15).max(1.5)
    }

    fn spawn_wave(&mut self) {
        for _ in 0..Self::enemy_count_for_stage(self.stage) {
            // Edge spawn, never on top of the player
            let pos = loop {
                let p = match self.common.rng.random_range(0..4u8) {
                    0 => Vec2::new(self.common.rng.random_range(0.0..WIDTH), ENEMY_RADIUS),
                    1 => Vec2::new(self.common.rng.random_range(0.0..WIDTH), HEIGHT - ENEMY_RADIUS),
                    2 => Vec2::new(ENEMY_RADIUS, self.common.rng.random_range(0.0..HEIGHT)),
                    _ => Vec2::new(WIDTH - ENEMY_RADIUS, self.common.rng.random_range(0.0..HEIGHT)),
                };
                if p.distance(self.pos) > ENEMY_STANDOFF {
                    break p;
                }
            };
            let interval = self.enemy_fire_interval();
            self.enemies.push(Enemy {
                pos,
                hp: 1 + (self.stage / 2) as i32,
                shoot_timer: self.common.rng.random_range(0.0..interval),
            });
        }
    }

    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if !self.common.alive {
            return;
        }
        self.common.frames += 1;
        let seconds = dt / TARGET_FPS;

        self.move_player(input, seconds);

        let to_pointer = input.pointer - self.pos;
        if to_pointer.length_squared() > 1.0 {
            self.aim = to_pointer.normalize();
        }

        self.handle_fire(input, seconds);
        self.advance_enemies(seconds);
        self.advance_bullets(seconds);
        self.common.fx.advance(dt);

        if self.health <= 0 {
            self.common
                .fx
                .spawn_burst(self.pos, 40, 2.0..9.0, [1.0, 0.2, 0.4], &mut self.common.rng);
            self.common.sfx(SfxCue::Crash);
            self.common.kill();
        } else if self.enemies.is_empty() {
            self.common.sfx(SfxCue::LevelClear);
            self.common.events.push(GameEvent::LevelClear);
        }
    }

    fn move_player(&mut self, input: &TickInput, seconds: f32) {
        let mut dir = Vec2::ZERO;
        if input.up {
            dir.y -= 1.0;
        }
        if input.down {
            dir.y += 1.0;
        }
        if input.left {
            dir.x -= 1.0;
        }
        if input.right {
            dir.x += 1.0;
        }
        if dir == Vec2::ZERO {
            return;
        }
        let next = self.pos + dir.normalize() * PLAYER_SPEED * seconds;
        let next = next.clamp(
            Vec2::splat(PLAYER_RADIUS),
            Vec2::new(WIDTH - PLAYER_RADIUS, HEIGHT - PLAYER_RADIUS),
        );
        // Cover is solid
        if !COVER
            .iter()
            .any(|c| collision::circle_overlaps_aabb(next, PLAYER_RADIUS, c))
        {
            self.pos = next;
        }
    }

    fn handle_fire(&mut self, input: &TickInput, seconds: f32) {
        if self.reload_timer > 0.0 {
            self.reload_timer -= seconds;
            if self.reload_timer <= 0.0 {
                self.ammo = MAGAZINE;
            }
            return;
        }
        if input.primary_pressed && self.ammo > 0 {
            self.ammo -= 1;
            self.bullets.push(Bullet {
                pos: self.pos + self.aim * PLAYER_RADIUS,
                vel: self.aim * BULLET_SPEED,
                life: BULLET_LIFE,
            });
            self.common.sfx(SfxCue::Shoot);
            if self.ammo == 0 {
                self.reload_timer = RELOAD_SECONDS;
            }
        }
    }

    fn advance_enemies(&mut self, seconds: f32) {
        let player = self.pos;
        let interval = self.enemy_fire_interval();
        let mut shots: Vec<Vec2> = Vec::new();
        for enemy in &mut self.enemies {
            let to_player = player - enemy.pos;
            let dist = to_player.length();
            if dist > ENEMY_STANDOFF {
                enemy.pos += to_player / dist * ENEMY_SPEED * seconds;
            }
            enemy.shoot_timer -= seconds;
            if enemy.shoot_timer <= 0.0 && dist < ENEMY_FIRE_RANGE {
                enemy.shoot_timer = interval;
                shots.push(enemy.pos);
            }
        }
        for origin in shots {
            let base = (player - origin).normalize_or_zero();
            let spread = self.common.rng.random_range(-ENEMY_SPREAD..ENEMY_SPREAD);
            let (sin, cos) = spread.sin_cos();
            let dir = Vec2::new(base.x * cos - base.y * sin, base.x * sin + base.y * cos);
            self.enemy_bullets.push(Bullet {
                pos: origin,
                vel: dir * ENEMY_BULLET_SPEED,
                life: 3.0,
            });
        }
    }

    fn advance_bullets(&mut self, seconds: f32) {
        for b in &mut self.bullets {
            b.pos += b.vel * seconds;
            b.life -= seconds;
        }
        for b in &mut self.enemy_bullets {
            b.pos += b.vel * seconds;
            b.life -= seconds;
        }

        // Player bullets against cover and enemies
        let mut kills: Vec<Vec2> = Vec::new();
        let enemies = &mut self.enemies;
        self.bullets.retain(|b| {
            if b.life <= 0.0 || COVER.iter().any(|c| c.contains(b.pos)) {
                return false;
            }
            if let Some(idx) = enemies
                .iter()
                .position(|e| e.pos.distance(b.pos) < ENEMY_RADIUS)
            {
                enemies[idx].hp -= 1;
                if enemies[idx].hp <= 0 {
                    kills.push(enemies.swap_remove(idx).pos);
                }
                return false;
            }
            true
        });
        for pos in kills {
            self.common.add_score(100 * self.stage as u64);
            self.common.sfx(SfxCue::EnemyDown);
            self.common
                .fx
                .spawn_burst(pos, 25, 2.0..7.0, [1.0, 0.5, 0.1], &mut self.common.rng);
        }

        // Enemy bullets against cover and the player
        let player = self.pos;
        let mut hits = 0;
        self.enemy_bullets.retain(|b| {
            if b.life <= 0.0 || COVER.iter().any(|c| c.contains(b.pos)) {
                return false;
            }
            if b.pos.distance(player) < PLAYER_RADIUS {
                hits += 1;
                return false;
            }
            true
        });
        for _ in 0..hits {
            self.health -= BULLET_DAMAGE;
            self.common.sfx(SfxCue::Damage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still() -> TickInput {
        TickInput {
            pointer: Vec2::new(WIDTH, HEIGHT / 2.0),
            ..Default::default()
        }
    }

    #[test]
    fn wave_size_grows_with_stage() {
        assert_eq!(ShooterState::enemy_count_for_stage(1), 4);
        assert_eq!(ShooterState::enemy_count_for_stage(5), 8);
        let state = ShooterState::new(1);
        assert_eq!(state.enemies.len(), 4);
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut state = ShooterState::new(1);
        state.enemies.clear();
        state.enemies.push(Enemy {
            pos: Vec2::new(WIDTH - 10.0, 10.0),
            hp: 100,
            shoot_timer: 1000.0,
        });
        let start = state.pos;
        let input = TickInput {
            up: true,
            right: true,
            pointer: start,
            ..Default::default()
        };
        state.tick(&input, 1.0);
        let moved = state.pos - start;
        let per_frame = PLAYER_SPEED / TARGET_FPS;
        assert!((moved.length() - per_frame).abs() < 1e-3);
    }

    #[test]
    fn firing_spends_ammo_then_reloads() {
        let mut state = ShooterState::new(1);
        state.enemies.clear();
        state.enemies.push(Enemy {
            pos: Vec2::new(10.0, 10.0),
            hp: 100,
            shoot_timer: 1000.0,
        });
        state.ammo = 1;
        let fire = TickInput {
            primary_pressed: true,
            pointer: Vec2::new(WIDTH, HEIGHT / 2.0),
            ..Default::default()
        };
        state.tick(&fire, 1.0);
        assert_eq!(state.ammo, 0);
        assert!(state.reload_timer > 0.0);
        assert_eq!(state.bullets.len(), 1);
        // Trigger does nothing while reloading
        state.tick(&fire, 1.0);
        assert_eq!(state.bullets.iter().filter(|b| b.life > 0.9).count(), 1);
        // Reload completes after the timer runs down
        for _ in 0..((RELOAD_SECONDS * TARGET_FPS) as usize + 2) {
            state.tick(&still(), 1.0);
        }
        assert_eq!(state.ammo, MAGAZINE);
    }

    #[test]
    fn kill_scores_hundred_times_stage() {
        let mut state = ShooterState::new(1);
        state.enemies.clear();
        state.enemies.push(Enemy {
            pos: state.pos + Vec2::new(100.0, 0.0),
            hp: 1,
            shoot_timer: 1000.0,
        });
        // Second enemy keeps the wave alive so no LevelClear fires here
        state.enemies.push(Enemy {
            pos: Vec2::new(10.0, 10.0),
            hp: 100,
            shoot_timer: 1000.0,
        });
        state.bullets.push(Bullet {
            pos: state.pos + Vec2::new(95.0, 0.0),
            vel: Vec2::new(BULLET_SPEED, 0.0),
            life: 1.0,
        });
        state.tick(&still(), 1.0);
        assert_eq!(state.common.score, 100);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn clearing_the_wave_emits_level_clear() {
        let mut state = ShooterState::new(1);
        state.enemies.clear();
        state.tick(&still(), 1.0);
        assert!(state.common.events.contains(&GameEvent::LevelClear));
        assert!(state.common.alive);
    }

    #[test]
    fn advance_stage_restocks_and_carries_state() {
        let mut state = ShooterState::new(1);
        state.common.score = 400;
        state.health = 70;
        state.enemies.clear();
        state.advance_stage();
        assert_eq!(state.stage, 2);
        assert_eq!(state.enemies.len(), 5);
        assert_eq!(state.common.score, 400);
        assert_eq!(state.health, 70);
    }

    #[test]
    fn enemy_bullet_hit_costs_ten_health() {
        let mut state = ShooterState::new(1);
        state.enemies.clear();
        state.enemies.push(Enemy {
            pos: Vec2::new(10.0, 10.0),
            hp: 100,
            shoot_timer: 1000.0,
        });
        state.enemy_bullets.push(Bullet {
            pos: state.pos,
            vel: Vec2::ZERO,
            life: 1.0,
        });
        state.tick(&still(), 1.0);
        assert_eq!(state.health, MAX_HEALTH - 10);
    }

    #[test]
    fn health_zero_kills_once() {
        let mut state = ShooterState::new(1);
        state.enemies.clear();
        state.enemies.push(Enemy {
            pos: Vec2::new(10.0, 10.0),
            hp: 100,
            shoot_timer: 1000.0,
        });
        state.health = 10;
        state.enemy_bullets.push(Bullet {
            pos: state.pos,
            vel: Vec2::ZERO,
            life: 1.0,
        });
        state.enemy_bullets.push(Bullet {
            pos: state.pos,
            vel: Vec2::ZERO,
            life: 1.0,
        });
        state.tick(&still(), 1.0);
        assert!(state.health <= 0);
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
    fn cover_blocks_bullets() {
        let mut state = ShooterState::new(1);
        state.enemies.clear();
        state.enemies.push(Enemy {
            pos: Vec2::new(10.0, HEIGHT - 10.0),
            hp: 100,
            shoot_timer: 1000.0,
        });
        state.bullets.push(Bullet {
            pos: COVER[0].center(),
            vel: Vec2::ZERO,
            life: 1.0,
        });
        state.tick(&still(), 1.0);
        assert!(state.bullets.is_empty());
    }
}
