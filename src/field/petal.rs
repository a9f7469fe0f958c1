//! Petal data model and per-kind spawn distributions.
//!
//! A [`Petal`] is one falling element of the field.  Its kind decides which
//! distribution its size, speed, colour and wobble are drawn from:
//!
//! | Kind  | Role                  | Size      | Fall speed  | Wobble        |
//! |-------|-----------------------|-----------|-------------|---------------|
//! | Large | sparse foreground     | 14 – 32   | 0.35 – 0.8  | slow, wide    |
//! | Small | dense background drift| 2.5 – 7.5 | 0.8 – 2.2   | fast, narrow  |
//!
//! All tuning constants live here so the simulator ([`super::PetalField`])
//! only deals with motion and recycling.

use std::f32::consts::TAU;

use rand::Rng;

// ---------------------------------------------------------------------------
// PetalKind
// ---------------------------------------------------------------------------

/// Category of a petal.  Fixed at spawn and preserved across recycling, so
/// the field's large/small ratio never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetalKind {
    /// Foreground petal — big, slow, rendered as a shaded teardrop.
    Large,
    /// Background petal — small, fast, rendered as a plain ellipse.
    Small,
}

impl PetalKind {
    /// Spatial frequency of the horizontal oscillation (radians per pixel of
    /// descent).  Large petals sway slowly, small ones flutter.
    pub fn wobble_frequency(self) -> f32 {
        match self {
            PetalKind::Large => 0.008,
            PetalKind::Small => 0.018,
        }
    }

    /// Amplitude of the horizontal oscillation in pixels per tick.
    pub fn wobble_amplitude(self) -> f32 {
        match self {
            PetalKind::Large => 0.9,
            PetalKind::Small => 0.6,
        }
    }
}

// ---------------------------------------------------------------------------
// Petal
// ---------------------------------------------------------------------------

/// One simulated petal.  Plain data — all motion happens in
/// [`PetalField::tick`](super::PetalField::tick).
///
/// Coordinates are surface pixels; `y` grows downward.
#[derive(Debug, Clone)]
pub struct Petal {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.  Starts at `-size` (just above the surface).
    pub y: f32,
    /// Visual radius/scale in pixels.  Always positive.
    pub size: f32,
    /// Horizontal drift per tick (before wobble is added).
    pub speed_x: f32,
    /// Vertical descent per tick.  Always positive.
    pub speed_y: f32,
    /// Current rotation in radians.
    pub angle: f32,
    /// Angular velocity in radians per tick.
    pub spin: f32,
    /// Render opacity in `[0, 1]`.
    pub opacity: f32,
    /// Colour hue in degrees.
    pub hue: f32,
    /// Colour saturation in percent.
    pub sat: f32,
    /// Category — decides distributions and render shape.
    pub kind: PetalKind,
    /// Phase offset seeding the horizontal oscillation, so petals with the
    /// same descent are not in lockstep.
    pub wobble: f32,
}

impl Petal {
    /// Sample a fresh petal of `kind` at the spawn line (`y = -size`) with a
    /// uniformly random `x` in `[0, width)`.
    pub fn spawn(kind: PetalKind, width: f32, rng: &mut impl Rng) -> Self {
        match kind {
            PetalKind::Large => {
                let size = 14.0 + rng.gen::<f32>() * 18.0;
                Self {
                    x: rng.gen::<f32>() * width,
                    y: -size,
                    size,
                    speed_y: 0.35 + rng.gen::<f32>() * 0.45,
                    speed_x: (rng.gen::<f32>() - 0.5) * 0.3,
                    angle: rng.gen::<f32>() * TAU,
                    spin: (rng.gen::<f32>() - 0.5) * 0.012,
                    opacity: 0.55 + rng.gen::<f32>() * 0.35,
                    hue: 335.0 + rng.gen::<f32>() * 15.0,
                    sat: 60.0 + rng.gen::<f32>() * 20.0,
                    kind,
                    wobble: rng.gen::<f32>() * 100.0,
                }
            }
            PetalKind::Small => {
                let size = 2.5 + rng.gen::<f32>() * 5.0;
                Self {
                    x: rng.gen::<f32>() * width,
                    y: -size,
                    size,
                    speed_y: 0.8 + rng.gen::<f32>() * 1.4,
                    speed_x: (rng.gen::<f32>() - 0.5) * 0.7,
                    angle: rng.gen::<f32>() * TAU,
                    spin: (rng.gen::<f32>() - 0.5) * 0.06,
                    opacity: 0.25 + rng.gen::<f32>() * 0.4,
                    hue: 340.0 + rng.gen::<f32>() * 25.0,
                    sat: 55.0 + rng.gen::<f32>() * 30.0,
                    kind,
                    wobble: rng.gen::<f32>() * 100.0,
                }
            }
        }
    }

    /// The vertical coordinate past which this petal is off-surface and must
    /// be recycled: `surface_height + 2 × size`.
    pub fn exit_line(&self, surface_height: f32) -> f32 {
        surface_height + 2.0 * self.size
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn large_spawn_within_distribution_bounds() {
        let mut rng = rng();
        for _ in 0..200 {
            let p = Petal::spawn(PetalKind::Large, 800.0, &mut rng);
            assert_eq!(p.kind, PetalKind::Large);
            assert!(p.size >= 14.0 && p.size < 32.0);
            assert!(p.speed_y >= 0.35 && p.speed_y < 0.8);
            assert!(p.opacity >= 0.55 && p.opacity <= 0.9);
            assert!(p.hue >= 335.0 && p.hue < 350.0);
            assert!((p.y + p.size).abs() < f32::EPSILON, "spawns at y = -size");
            assert!(p.x >= 0.0 && p.x < 800.0);
        }
    }

    #[test]
    fn small_spawn_within_distribution_bounds() {
        let mut rng = rng();
        for _ in 0..200 {
            let p = Petal::spawn(PetalKind::Small, 640.0, &mut rng);
            assert_eq!(p.kind, PetalKind::Small);
            assert!(p.size >= 2.5 && p.size < 7.5);
            assert!(p.speed_y >= 0.8 && p.speed_y < 2.2);
            assert!(p.opacity >= 0.25 && p.opacity <= 0.65);
            assert!(p.x >= 0.0 && p.x < 640.0);
        }
    }

    #[test]
    fn descent_speed_is_always_positive() {
        let mut rng = rng();
        for _ in 0..500 {
            let large = Petal::spawn(PetalKind::Large, 100.0, &mut rng);
            let small = Petal::spawn(PetalKind::Small, 100.0, &mut rng);
            assert!(large.speed_y > 0.0);
            assert!(small.speed_y > 0.0);
        }
    }

    #[test]
    fn large_wobble_is_slower_and_wider_than_small() {
        assert!(PetalKind::Large.wobble_frequency() < PetalKind::Small.wobble_frequency());
        assert!(PetalKind::Large.wobble_amplitude() > PetalKind::Small.wobble_amplitude());
    }

    #[test]
    fn exit_line_is_two_sizes_below_surface() {
        let mut rng = rng();
        let p = Petal::spawn(PetalKind::Large, 100.0, &mut rng);
        assert!((p.exit_line(600.0) - (600.0 + 2.0 * p.size)).abs() < f32::EPSILON);
    }
}
