//! egui rendering for the petal field.
//!
//! Called once per frame, right after [`PetalField::tick`]: the surface is
//! cleared (a full-rect fill — no accumulation between frames) and every
//! petal is drawn at its current transform.
//!
//! Large petals are a teardrop silhouette built from two cubic beziers, with
//! a lighter centre layered over a darker edge (egui has no radial gradient
//! primitive, so the gradient is approximated with two fills) and a faint
//! central vein stroke.  Small petals are a plain ellipse elongated along
//! the petal's vertical axis.

use egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use super::field::PetalField;
use super::petal::{Petal, PetalKind};

/// Segments used to sample each cubic bezier of the teardrop outline.
const BEZIER_STEPS: usize = 12;
/// Segments used to sample the small-petal ellipse.
const ELLIPSE_STEPS: usize = 16;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Clear `rect` and draw every petal of `field` into it.
///
/// Petal coordinates are relative to the field surface; `rect.min` is the
/// surface origin on screen.
pub fn paint_field(painter: &Painter, rect: Rect, background: Color32, field: &PetalField) {
    painter.rect_filled(rect, 0.0, background);

    for petal in field.petals() {
        let origin = rect.min + Vec2::new(petal.x, petal.y);
        match petal.kind {
            PetalKind::Large => paint_large(painter, origin, petal),
            PetalKind::Small => paint_small(painter, origin, petal),
        }
    }
}

// ---------------------------------------------------------------------------
// Petal shapes
// ---------------------------------------------------------------------------

fn paint_large(painter: &Painter, origin: Pos2, petal: &Petal) {
    let s = petal.size;

    // Darker edge layer, then a lighter centre shifted toward the petal tip —
    // the two-fill approximation of the original's radial gradient.
    let edge = hsl_color(petal.hue - 5.0, petal.sat - 10.0, 75.0, 0.6 * petal.opacity);
    let center = hsl_color(petal.hue, petal.sat, 92.0, petal.opacity);

    let outline = teardrop_outline(s);
    painter.add(egui::Shape::convex_polygon(
        transform(&outline, origin, petal.angle, 1.0, Vec2::ZERO),
        edge,
        Stroke::NONE,
    ));
    painter.add(egui::Shape::convex_polygon(
        transform(&outline, origin, petal.angle, 0.55, Vec2::new(0.0, -0.2 * s)),
        center,
        Stroke::NONE,
    ));

    // Central vein.
    let vein = hsl_color(petal.hue - 10.0, 40.0, 70.0, 0.25 * petal.opacity);
    let top = rotate(Vec2::new(0.0, -0.9 * s), petal.angle);
    let bottom = rotate(Vec2::new(0.0, 0.7 * s), petal.angle);
    painter.line_segment(
        [origin + top, origin + bottom],
        Stroke::new(0.5, vein),
    );
}

fn paint_small(painter: &Painter, origin: Pos2, petal: &Petal) {
    let fill = hsl_color(petal.hue, petal.sat, 88.0, petal.opacity);
    let outline = ellipse_outline(petal.size * 0.45, petal.size);
    painter.add(egui::Shape::convex_polygon(
        transform(&outline, origin, petal.angle, 1.0, Vec2::ZERO),
        fill,
        Stroke::NONE,
    ));
}

// ---------------------------------------------------------------------------
// Geometry helpers
// ---------------------------------------------------------------------------

/// Teardrop silhouette in local (unrotated) petal space, tip up.
///
/// Matches the two mirrored cubic beziers of the source shape:
/// `(0,-s) → (0, 0.9s)` bulging right, then back up bulging left.
fn teardrop_outline(s: f32) -> Vec<Vec2> {
    let mut points = Vec::with_capacity(2 * BEZIER_STEPS);
    let top = Vec2::new(0.0, -s);
    let bottom = Vec2::new(0.0, 0.9 * s);

    sample_cubic(
        &mut points,
        top,
        Vec2::new(0.6 * s, -0.6 * s),
        Vec2::new(0.7 * s, 0.4 * s),
        bottom,
    );
    sample_cubic(
        &mut points,
        bottom,
        Vec2::new(-0.7 * s, 0.4 * s),
        Vec2::new(-0.6 * s, -0.6 * s),
        top,
    );
    points
}

/// Ellipse with half-axes `rx` (horizontal) and `ry` (vertical), centred on
/// the origin.
fn ellipse_outline(rx: f32, ry: f32) -> Vec<Vec2> {
    (0..ELLIPSE_STEPS)
        .map(|i| {
            let t = i as f32 / ELLIPSE_STEPS as f32 * std::f32::consts::TAU;
            Vec2::new(rx * t.cos(), ry * t.sin())
        })
        .collect()
}

/// Append `BEZIER_STEPS` samples of the cubic `(p0, c0, c1, p1)`, excluding
/// the end point (the next segment supplies it).
fn sample_cubic(out: &mut Vec<Vec2>, p0: Vec2, c0: Vec2, c1: Vec2, p1: Vec2) {
    for i in 0..BEZIER_STEPS {
        let t = i as f32 / BEZIER_STEPS as f32;
        let u = 1.0 - t;
        let point = p0 * (u * u * u)
            + c0 * (3.0 * u * u * t)
            + c1 * (3.0 * u * t * t)
            + p1 * (t * t * t);
        out.push(point);
    }
}

/// Scale, offset, rotate and translate `points` into screen space.
fn transform(points: &[Vec2], origin: Pos2, angle: f32, scale: f32, offset: Vec2) -> Vec<Pos2> {
    points
        .iter()
        .map(|p| origin + rotate(*p * scale + offset, angle))
        .collect()
}

fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

/// Convert HSL (`hue` degrees, `sat`/`light` percent) plus alpha in `[0, 1]`
/// to a premultiplied-free [`Color32`].
///
/// The petal colour parameters are stored as HSL because the source palette
/// is defined that way; egui wants sRGB bytes.
pub fn hsl_color(hue: f32, sat: f32, light: f32, alpha: f32) -> Color32 {
    let h = hue.rem_euclid(360.0);
    let s = (sat / 100.0).clamp(0.0, 1.0);
    let l = (light / 100.0).clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_byte = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(
        to_byte(r),
        to_byte(g),
        to_byte(b),
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- hsl_color ---

    #[test]
    fn primary_hues_convert_exactly() {
        assert_eq!(hsl_color(0.0, 100.0, 50.0, 1.0), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl_color(120.0, 100.0, 50.0, 1.0), Color32::from_rgb(0, 255, 0));
        assert_eq!(hsl_color(240.0, 100.0, 50.0, 1.0), Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn zero_saturation_is_gray() {
        let c = hsl_color(123.0, 0.0, 50.0, 1.0);
        assert_eq!(c.r(), c.g());
        assert_eq!(c.g(), c.b());
    }

    #[test]
    fn full_lightness_is_white_regardless_of_hue() {
        assert_eq!(hsl_color(347.0, 70.0, 100.0, 1.0), Color32::WHITE);
    }

    #[test]
    fn alpha_maps_to_byte_range() {
        assert_eq!(hsl_color(0.0, 0.0, 0.0, 0.0).a(), 0);
        assert_eq!(hsl_color(0.0, 0.0, 0.0, 1.0).a(), 255);
    }

    #[test]
    fn hue_wraps_past_360_degrees() {
        // The small-petal distribution can sample hues up to 365.
        assert_eq!(
            hsl_color(365.0, 60.0, 88.0, 1.0),
            hsl_color(5.0, 60.0, 88.0, 1.0)
        );
    }

    // ---- Geometry ---

    #[test]
    fn teardrop_outline_is_closed_and_symmetric_in_extent() {
        let points = teardrop_outline(10.0);
        assert_eq!(points.len(), 2 * BEZIER_STEPS);

        let max_x = points.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        let min_x = points.iter().map(|p| p.x).fold(f32::MAX, f32::min);
        assert!((max_x + min_x).abs() < 0.1, "left/right halves mirror");

        let min_y = points.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!((min_y + 10.0).abs() < 0.1, "tip sits at -size");
    }

    #[test]
    fn ellipse_outline_is_elongated_vertically() {
        let points = ellipse_outline(4.5, 10.0);
        assert_eq!(points.len(), ELLIPSE_STEPS);
        let max_x = points.iter().map(|p| p.x.abs()).fold(0.0_f32, f32::max);
        let max_y = points.iter().map(|p| p.y.abs()).fold(0.0_f32, f32::max);
        assert!(max_y > max_x);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = rotate(Vec2::new(1.0, 0.0), std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }
}
