//! The petal field simulator.
//!
//! [`PetalField`] owns a fixed-size collection of [`Petal`]s and advances it
//! one physics step per [`tick`](PetalField::tick).  The host (the egui view)
//! calls `tick` once per animation frame and then paints the result — there
//! is no internal timer.
//!
//! # Invariants
//!
//! * The collection size and the large/small split are fixed at construction.
//!   A petal that falls past `surface_height + 2 × size` is **replaced in its
//!   slot** by a fresh petal of the same kind; nothing is ever appended or
//!   removed.
//! * The field is created already in steady state: initial `y` positions are
//!   spread uniformly over the full surface height instead of starting at the
//!   spawn line.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::petal::{Petal, PetalKind};

// ---------------------------------------------------------------------------
// FieldError
// ---------------------------------------------------------------------------

/// Errors that can arise when constructing the simulator.
#[derive(Debug, Clone, Error)]
pub enum FieldError {
    /// The drawing surface has zero or negative dimensions.  This is a fatal
    /// precondition — the host must not create the field without a surface.
    #[error("Drawing surface is empty ({width} × {height})")]
    EmptySurface { width: f32, height: f32 },
}

// ---------------------------------------------------------------------------
// FieldCounts
// ---------------------------------------------------------------------------

/// How many petals of each kind the field holds.
///
/// Large petals are sparse foreground elements; small petals form the dense
/// background drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCounts {
    pub large: usize,
    pub small: usize,
}

impl Default for FieldCounts {
    fn default() -> Self {
        Self {
            large: 8,
            small: 45,
        }
    }
}

// ---------------------------------------------------------------------------
// PetalField
// ---------------------------------------------------------------------------

/// Fixed-size falling-petal simulation.
///
/// # Example
///
/// ```rust
/// use sakura_stage::field::{FieldCounts, PetalField};
///
/// let mut field = PetalField::new(800.0, 600.0, FieldCounts::default()).unwrap();
/// field.tick(); // one physics step — normally called once per frame
/// assert_eq!(field.petals().len(), 8 + 45);
/// ```
pub struct PetalField {
    petals: Vec<Petal>,
    width: f32,
    height: f32,
    rng: StdRng,
}

impl PetalField {
    /// Create a field of `counts` petals over a `width × height` surface.
    ///
    /// Initial vertical positions are randomised across `[0, height)` so the
    /// field appears mid-fall from the first frame.
    ///
    /// # Errors
    ///
    /// [`FieldError::EmptySurface`] when either dimension is not positive.
    pub fn new(width: f32, height: f32, counts: FieldCounts) -> Result<Self, FieldError> {
        Self::with_rng(width, height, counts, StdRng::from_entropy())
    }

    /// Like [`new`](Self::new) but with a caller-supplied seed, so tests get
    /// a deterministic petal population.
    pub fn from_seed(
        width: f32,
        height: f32,
        counts: FieldCounts,
        seed: u64,
    ) -> Result<Self, FieldError> {
        Self::with_rng(width, height, counts, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        width: f32,
        height: f32,
        counts: FieldCounts,
        mut rng: StdRng,
    ) -> Result<Self, FieldError> {
        if width <= 0.0 || height <= 0.0 {
            return Err(FieldError::EmptySurface { width, height });
        }

        let mut petals = Vec::with_capacity(counts.large + counts.small);
        for _ in 0..counts.large {
            let mut p = Petal::spawn(PetalKind::Large, width, &mut rng);
            p.y = rng.gen::<f32>() * height;
            petals.push(p);
        }
        for _ in 0..counts.small {
            let mut p = Petal::spawn(PetalKind::Small, width, &mut rng);
            p.y = rng.gen::<f32>() * height;
            petals.push(p);
        }

        log::debug!(
            "petal field created: {} large + {} small over {width}×{height}",
            counts.large,
            counts.small
        );

        Ok(Self {
            petals,
            width,
            height,
            rng,
        })
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Advance every petal one step and recycle the ones that left the
    /// surface.
    ///
    /// Per petal: `y += speed_y`,
    /// `x += speed_x + sin((y + wobble) × freq) × amp` with the per-kind
    /// wobble constants, `angle += spin`.  A petal past its exit line is
    /// replaced in place by a fresh one of the same kind at the spawn line.
    pub fn tick(&mut self) {
        for petal in &mut self.petals {
            petal.y += petal.speed_y;
            petal.x += petal.speed_x
                + ((petal.y + petal.wobble) * petal.kind.wobble_frequency()).sin()
                    * petal.kind.wobble_amplitude();
            petal.angle += petal.spin;

            if petal.y > petal.exit_line(self.height) {
                *petal = Petal::spawn(petal.kind, self.width, &mut self.rng);
            }
        }
    }

    /// Update the surface bounds used for recycling and spawn randomisation.
    ///
    /// Existing petal positions are left untouched.  Zero or negative
    /// dimensions are ignored and the last-known bounds stay in effect.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring degenerate resize to {width}×{height}");
            return;
        }
        self.width = width;
        self.height = height;
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Read-only view of the live collection, for rendering.
    pub fn petals(&self) -> &[Petal] {
        &self.petals
    }

    /// Current surface width in pixels.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Current surface height in pixels.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Number of petals of the given kind currently in the collection.
    pub fn count_of(&self, kind: PetalKind) -> usize {
        self.petals.iter().filter(|p| p.kind == kind).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
