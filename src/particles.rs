//! Decorative hearts around the letter. Nothing in the sequencing waits on them.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::*;
use crate::stage::Rect;

const GLYPHS: [char; 4] = ['♥', '❤', '✿', '✦'];
const COLORS: [[u8; 3]; 4] = [
    [255, 105, 135], // Rose
    [255, 160, 190], // Blush
    [236, 120, 200], // Orchid
    [255, 200, 120], // Peach
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub glyph: char,
    pub color: [u8; 3],
    pub size: f32,
    drift: f32,
    age: Duration,
    lifetime: Duration,
}

impl Particle {
    pub fn age(&self) -> Duration {
        self.age
    }

    /// Fades linearly to zero over the lifetime.
    pub fn opacity(&self) -> f32 {
        if self.lifetime.is_zero() {
            return 0.0;
        }
        (1.0 - self.age.as_secs_f32() / self.lifetime.as_secs_f32()).clamp(0.0, 1.0)
    }
}

pub struct ParticleField {
    area: Rect,
    lifetime: Duration,
    ambient_interval: Duration,
    ambient_timer: Duration,
    enabled: bool,
    particles: Vec<Particle>,
    next_id: u64,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(area: Rect, lifetime: Duration, ambient_interval: Duration) -> Self {
        Self::with_rng(area, lifetime, ambient_interval, StdRng::from_rng(&mut rand::rng()))
    }

    pub fn with_seed(area: Rect, lifetime: Duration, ambient_interval: Duration, seed: u64) -> Self {
        Self::with_rng(area, lifetime, ambient_interval, StdRng::seed_from_u64(seed))
    }

    fn with_rng(area: Rect, lifetime: Duration, ambient_interval: Duration, rng: StdRng) -> Self {
        Self {
            area,
            lifetime,
            ambient_interval,
            ambient_timer: Duration::ZERO,
            enabled: true,
            particles: Vec::new(),
            next_id: 0,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turning particles off removes every live one at once.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.ambient_timer = Duration::ZERO;
    }

    pub fn spawn_at(&mut self, x: f32, y: f32) -> Option<Particle> {
        if !self.enabled {
            return None;
        }
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        let particle = Particle {
            id: self.next_id,
            x,
            y,
            glyph: GLYPHS[self.rng.random_range(0..GLYPHS.len())],
            color: COLORS[self.rng.random_range(0..COLORS.len())],
            size: self.rng.random_range(14.0..=28.0),
            drift: self.rng.random_range(-20.0..=20.0),
            age: Duration::ZERO,
            lifetime: self.lifetime,
        };
        self.next_id += 1;
        self.particles.push(particle);
        Some(particle)
    }

    /// Ages and moves live particles, then spawns ambient ones when `ambient` is set.
    /// Returns what was spawned.
    pub fn update(&mut self, dt: Duration, ambient: bool) -> Vec<Particle> {
        let seconds = dt.as_secs_f32();
        for particle in self.particles.iter_mut() {
            particle.age += dt;
            particle.y -= PARTICLE_RISE_SPEED * seconds;
            particle.x += particle.drift * seconds;
        }
        self.particles.retain(|particle| particle.age < particle.lifetime);

        let mut spawned = Vec::new();
        if !self.enabled || !ambient || self.ambient_interval.is_zero() {
            return spawned;
        }
        self.ambient_timer += dt;
        while self.ambient_timer >= self.ambient_interval {
            self.ambient_timer -= self.ambient_interval;
            let band = self.area.lower_band(0.2);
            let x = self.rng.random_range(band.x..=band.x + band.width);
            let y = self.rng.random_range(band.y..=band.y + band.height);
            spawned.extend(self.spawn_at(x, y));
        }
        spawned
    }
}
