//! Canvas 2D rendering. One draw path per game; all neon styling lives here
//! and never feeds back into the sims.

use glam::Vec2;
use web_sys::CanvasRenderingContext2d;

use crate::fx::ParticleSystem;
use crate::settings::Settings;
use crate::sim::{breaker, dash, flappy, racer, shooter, snake, GameKind, GameSim};

const BACKGROUND: &str = "#0a0a14";
const GRID_LINE: &str = "rgba(0, 255, 230, 0.08)";

/// Logical surface size per game; the canvas is sized to match.
pub fn surface_size(kind: GameKind) -> (f32, f32) {
    match kind {
        GameKind::Dash => (dash::WIDTH, dash::HEIGHT),
        GameKind::Flappy => (flappy::WIDTH, flappy::HEIGHT),
        GameKind::Racer => (racer::WIDTH, racer::HEIGHT),
        GameKind::Breaker => (breaker::WIDTH, breaker::HEIGHT),
        GameKind::Shooter => (shooter::WIDTH, shooter::HEIGHT),
        GameKind::Snake => (snake::GRID as f32 * snake::TILE, snake::GRID as f32 * snake::TILE),
    }
}

fn rgba(color: [f32; 3], alpha: f32) -> String {
    format!(
        "rgba({}, {}, {}, {alpha:.3})",
        (color[0] * 255.0) as u8,
        (color[1] * 255.0) as u8,
        (color[2] * 255.0) as u8,
    )
}

pub struct Renderer {
    ctx: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    pub fn draw(&self, sim: &GameSim, settings: &Settings) {
        let (w, h) = surface_size(sim.kind());
        self.ctx.set_fill_style_str(BACKGROUND);
        self.ctx.fill_rect(0.0, 0.0, w as f64, h as f64);
        if settings.background_fx {
            self.draw_grid(w, h);
        }

        // A burst spawned within the last few frames jolts the whole scene
        let shaking = settings.effective_screen_shake()
            && sim.common().fx.particles().iter().any(|p| p.life > 0.9);
        if shaking {
            self.ctx.save();
            let f = sim.common().frames as f64;
            let _ = self.ctx.translate((f * 12.9898).sin() * 3.0, (f * 78.233).sin() * 3.0);
        }

        match sim {
            GameSim::Dash(s) => self.draw_dash(s),
            GameSim::Flappy(s) => self.draw_flappy(s),
            GameSim::Racer(s) => self.draw_racer(s),
            GameSim::Breaker(s) => self.draw_breaker(s),
            GameSim::Shooter(s) => self.draw_shooter(s),
            GameSim::Snake(s) => self.draw_snake(s),
        }

        if settings.particles {
            self.draw_particles(&sim.common().fx);
        }

        if shaking {
            self.ctx.restore();
        }
    }

    fn draw_grid(&self, w: f32, h: f32) {
        self.ctx.set_stroke_style_str(GRID_LINE);
        self.ctx.set_line_width(1.0);
        let step = 40.0;
        let mut x = 0.0;
        while x <= w {
            self.ctx.begin_path();
            self.ctx.move_to(x as f64, 0.0);
            self.ctx.line_to(x as f64, h as f64);
            self.ctx.stroke();
            x += step;
        }
        let mut y = 0.0;
        while y <= h {
            self.ctx.begin_path();
            self.ctx.move_to(0.0, y as f64);
            self.ctx.line_to(w as f64, y as f64);
            self.ctx.stroke();
            y += step;
        }
    }

    fn draw_particles(&self, fx: &ParticleSystem) {
        for p in fx.particles() {
            self.ctx.set_fill_style_str(&rgba(p.color, p.life));
            self.ctx.fill_rect(
                (p.pos.x - p.size / 2.0) as f64,
                (p.pos.y - p.size / 2.0) as f64,
                p.size as f64,
                p.size as f64,
            );
        }
    }

    fn fill_rect_c(&self, pos: Vec2, size: Vec2, style: &str) {
        self.ctx.set_fill_style_str(style);
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&self, center: Vec2, radius: f32, style: &str) {
        self.ctx.set_fill_style_str(style);
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn draw_dash(&self, s: &dash::DashState) {
        // Ground line
        self.fill_rect_c(
            Vec2::new(0.0, dash::GROUND_Y),
            Vec2::new(dash::WIDTH, 3.0),
            "#00ffe6",
        );

        for o in &s.obstacles {
            match o.kind {
                dash::ObstacleKind::Spike => {
                    self.ctx.set_fill_style_str("#ff2e88");
                    self.ctx.begin_path();
                    self.ctx
                        .move_to(o.rect.pos.x as f64, o.rect.bottom() as f64);
                    self.ctx
                        .line_to(o.rect.center().x as f64, o.rect.pos.y as f64);
                    self.ctx
                        .line_to(o.rect.right() as f64, o.rect.bottom() as f64);
                    self.ctx.close_path();
                    self.ctx.fill();
                }
                dash::ObstacleKind::Block => {
                    self.fill_rect_c(o.rect.pos, o.rect.size, "#7a3cff");
                }
            }
        }

        // Rotating cube
        let b = s.player_box();
        let c = b.center();
        self.ctx.save();
        let _ = self.ctx.translate(c.x as f64, c.y as f64);
        let _ = self.ctx.rotate(s.rotation as f64);
        self.ctx.set_fill_style_str("#00ffe6");
        self.ctx.fill_rect(
            (-b.size.x / 2.0) as f64,
            (-b.size.y / 2.0) as f64,
            b.size.x as f64,
            b.size.y as f64,
        );
        self.ctx.restore();
    }

    fn draw_flappy(&self, s: &flappy::FlappyState) {
        for pipe in &s.pipes {
            let top = pipe.top_rect();
            let bottom = pipe.bottom_rect();
            self.fill_rect_c(top.pos, top.size, "#39ff6a");
            self.fill_rect_c(bottom.pos, bottom.size, "#39ff6a");
        }
        let b = s.bird_box();
        self.fill_circle(b.center(), flappy::BIRD_SIZE / 2.0, "#ffd23c");
    }

    fn draw_racer(&self, s: &racer::RacerState) {
        // Lane dividers
        self.ctx.set_stroke_style_str("rgba(255, 255, 255, 0.25)");
        self.ctx.set_line_width(2.0);
        for lane in 1..racer::LANES {
            let x = (racer::ROAD_LEFT + lane as f32 * racer::LANE_WIDTH) as f64;
            self.ctx.begin_path();
            self.ctx.move_to(x, 0.0);
            self.ctx.line_to(x, racer::HEIGHT as f64);
            self.ctx.stroke();
        }

        const PALETTE: [&str; racer::CAR_COLORS] =
            ["#ff2e88", "#39ff6a", "#ffd23c", "#7a3cff", "#ff7a3c"];
        let car_size = Vec2::new(50.0, racer::CAR_LENGTH);
        for car in &s.cars {
            let x = racer::lane_center_x(car.lane) - car_size.x / 2.0;
            self.fill_rect_c(Vec2::new(x, car.y - car_size.y / 2.0), car_size, PALETTE[car.color]);
        }

        let px = racer::lane_center_x(s.lane) - car_size.x / 2.0;
        self.fill_rect_c(
            Vec2::new(px, racer::PLAYER_Y - car_size.y / 2.0),
            car_size,
            "#00ffe6",
        );
    }

    fn draw_breaker(&self, s: &breaker::BreakerState) {
        for brick in &s.bricks {
            self.fill_rect_c(
                brick.rect.pos,
                brick.rect.size,
                &rgba(breaker::row_color(brick.row), 1.0),
            );
        }
        let paddle = s.paddle_rect();
        self.fill_rect_c(paddle.pos, paddle.size, "#00ffe6");
        self.fill_circle(s.ball_pos, breaker::BALL_RADIUS, "#ffffff");
    }

    fn draw_shooter(&self, s: &shooter::ShooterState) {
        for cover in &shooter::COVER {
            self.fill_rect_c(cover.pos, cover.size, "#2a2a4a");
        }
        for enemy in &s.enemies {
            self.fill_circle(enemy.pos, shooter::ENEMY_RADIUS, "#ff2e88");
        }
        for b in &s.bullets {
            self.fill_circle(b.pos, 4.0, "#00ffe6");
        }
        for b in &s.enemy_bullets {
            self.fill_circle(b.pos, 4.0, "#ff7a3c");
        }
        self.fill_circle(s.pos, shooter::PLAYER_RADIUS, "#00ffe6");
        // Aim tick
        let tip = s.pos + s.aim * (shooter::PLAYER_RADIUS + 8.0);
        self.ctx.set_stroke_style_str("#ffffff");
        self.ctx.begin_path();
        self.ctx.move_to(s.pos.x as f64, s.pos.y as f64);
        self.ctx.line_to(tip.x as f64, tip.y as f64);
        self.ctx.stroke();
    }

    fn draw_snake(&self, s: &snake::SnakeState) {
        for (i, cell) in s.body.iter().enumerate() {
            let c = snake::cell_center(*cell);
            let style = if i == 0 { "#39ff6a" } else { "#1fae4a" };
            self.fill_rect_c(
                c - Vec2::splat(snake::TILE / 2.0 - 1.0),
                Vec2::splat(snake::TILE - 2.0),
                style,
            );
        }
        self.fill_circle(snake::cell_center(s.food), snake::TILE / 2.5, "#ff2e88");
    }
}
