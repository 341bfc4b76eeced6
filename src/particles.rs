//! Falling hair-strand particles.
//!
//! A bounded ring buffer of strands (oldest evicted first) stepped once per
//! frame: gravity, horizontal damping, and a per-strand randomized ground line
//! where a strand comes to rest for good. Coordinates are canvas pixels, i.e.
//! CSS pixels scaled by the device pixel ratio.

use std::collections::VecDeque;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::ParticleConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HairShape {
    Line,
    Coil,
    Wavy,
}

impl HairShape {
    pub const ALL: [HairShape; 3] = [HairShape::Line, HairShape::Coil, HairShape::Wavy];

    /// Polyline for a strand of length `size`, growing upward from the origin
    /// in unrotated local coordinates.
    pub fn path(self, size: f64) -> Vec<(f64, f64)> {
        match self {
            HairShape::Line => vec![(0.0, 0.0), (0.0, -size)],
            HairShape::Coil => {
                const TURNS: f64 = 3.0;
                const STEPS: usize = 60;
                (0..=STEPS)
                    .map(|i| {
                        let t = i as f64 / STEPS as f64;
                        let angle = t * TURNS * PI * 2.0;
                        let radius = size * 0.05 + t * size * 0.08;
                        (angle.cos() * radius, -t * size)
                    })
                    .collect()
            }
            HairShape::Wavy => {
                const SEGMENTS: usize = 18;
                let amplitude = size * 0.12;
                (0..=SEGMENTS)
                    .map(|i| {
                        let t = i as f64 / SEGMENTS as f64;
                        ((t * PI * 3.0).sin() * amplitude, -t * size)
                    })
                    .collect()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Spawn order, unique for the field's lifetime.
    pub serial: u64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub rotation: f64,
    /// Index into the configured palette.
    pub color: usize,
    pub shape: HairShape,
    pub resting: bool,
    pub ground_y: f64,
}

pub struct ParticleField {
    cfg: ParticleConfig,
    particles: VecDeque<Particle>,
    width: f64,
    height: f64,
    dpr: f64,
    rng: SmallRng,
    last_pointer_spawn: Option<f64>,
    next_serial: u64,
}

impl ParticleField {
    /// `width`/`height` are CSS pixels; the canvas is `dpr` times larger.
    pub fn new(cfg: ParticleConfig, width: f64, height: f64, dpr: f64, seed: u64) -> Self {
        let mut field = Self {
            particles: VecDeque::with_capacity(cfg.capacity.min(1024)),
            cfg,
            width: 0.0,
            height: 0.0,
            dpr: 1.0,
            rng: SmallRng::seed_from_u64(seed),
            last_pointer_spawn: None,
            next_serial: 0,
        };
        field.resize(width, height, dpr);
        field
    }

    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) {
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        self.width = (width * self.dpr).floor().max(0.0);
        self.height = (height * self.dpr).floor().max(0.0);
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn color(&self, particle: &Particle) -> &str {
        self.cfg.palette.get(particle.color).map(String::as_str).unwrap_or("#1a1a1a")
    }

    /// Spawn one strand at CSS position `(x, y)`.
    pub fn spawn(&mut self, x: f64, y: f64) {
        let dpr = self.dpr;
        let palette_len = self.cfg.palette.len().max(1);
        let particle = Particle {
            serial: self.next_serial,
            x: x * dpr,
            y: y * dpr,
            vx: (self.rng.random::<f64>() * 0.6 - 0.3) * dpr,
            vy: -self.rng.random::<f64>() * 0.6 * dpr,
            size: (12.0 + self.rng.random::<f64>() * 20.0) * dpr,
            rotation: self.rng.random::<f64>() * FRAC_PI_2 - FRAC_PI_4,
            color: self.rng.random_range(0..palette_len),
            shape: HairShape::ALL[self.rng.random_range(0..HairShape::ALL.len())],
            resting: false,
            ground_y: self.height - self.rng.random::<f64>() * 40.0 * dpr,
        };
        self.next_serial += 1;
        self.particles.push_back(particle);
        while self.particles.len() > self.cfg.capacity {
            self.particles.pop_front();
        }
    }

    /// Spawn `count` strands jittered around `(x, y)`.
    /// Only the newest `capacity` would survive, so no more are spawned.
    pub fn spawn_burst(&mut self, x: f64, y: f64, count: u32) {
        let count = (count as usize).min(self.cfg.capacity);
        for _ in 0..count {
            let jx = x + (self.rng.random::<f64>() * 15.0 - 7.5);
            let jy = y + (self.rng.random::<f64>() * 10.0 - 5.0);
            self.spawn(jx, jy);
        }
    }

    /// Rate-limited trail spawn for a pointer move. Returns strands spawned.
    pub fn on_pointer_move(&mut self, x: f64, y: f64, now: f64) -> usize {
        if let Some(last) = self.last_pointer_spawn {
            if now - last < self.cfg.pointer_interval_ms {
                return 0;
            }
        }
        self.last_pointer_spawn = Some(now);
        let count = 1 + self.rng.random_range(0..2);
        for _ in 0..count {
            let jx = x + (self.rng.random::<f64>() * 8.0 - 4.0);
            let jy = y + (self.rng.random::<f64>() * 8.0 - 4.0);
            self.spawn(jx, jy);
        }
        count
    }

    /// Advance every falling strand by one frame.
    pub fn step(&mut self) {
        let gravity = self.cfg.gravity * self.dpr;
        let damping = self.cfg.horizontal_damping;
        let landing = self.cfg.landing_damping;
        let width = self.width;
        for p in self.particles.iter_mut().filter(|p| !p.resting) {
            p.vy += gravity;
            p.vx *= damping;
            p.x += p.vx;
            p.y += p.vy;
            if p.y >= p.ground_y {
                p.y = p.ground_y;
                p.vx *= landing;
                p.vy = 0.0;
                p.resting = true;
            }
            p.x = p.x.clamp(0.0, width);
        }
    }
}
