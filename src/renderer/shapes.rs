//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Segments used for circles unless a shape asks for more
pub const CIRCLE_SEGMENTS: u32 = 32;

/// A filled primitive in its layer's coordinate space
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    Ring { center: Vec2, inner_radius: f32, outer_radius: f32 },
    Rect { min: Vec2, max: Vec2 },
    /// Rectangle border drawn inside `min..max`
    RectOutline { min: Vec2, max: Vec2, thickness: f32 },
    Triangle([Vec2; 3]),
}

impl Shape {
    /// Append the shape's triangles to `out`
    pub fn tessellate(&self, color: [f32; 4], out: &mut Vec<Vertex>) {
        match *self {
            Shape::Circle { center, radius } => out.extend(circle(center, radius, color, CIRCLE_SEGMENTS)),
            Shape::Ring {
                center,
                inner_radius,
                outer_radius,
            } => out.extend(ring(center, inner_radius, outer_radius, color, CIRCLE_SEGMENTS)),
            Shape::Rect { min, max } => out.extend(rect(min, max, color)),
            Shape::RectOutline { min, max, thickness } => out.extend(rect_outline(min, max, thickness, color)),
            Shape::Triangle([a, b, c]) => out.extend([
                Vertex::new(a.x, a.y, color),
                Vertex::new(b.x, b.y, color),
                Vertex::new(c.x, c.y, color),
            ]),
        }
    }
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let (sin1, cos1) = theta1.sin_cos();
        let (sin2, cos2) = theta2.sin_cos();
        let inner1 = center + Vec2::new(cos1, sin1) * inner_radius;
        let outer1 = center + Vec2::new(cos1, sin1) * outer_radius;
        let inner2 = center + Vec2::new(cos2, sin2) * inner_radius;
        let outer2 = center + Vec2::new(cos2, sin2) * outer_radius;

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// Generate vertices for an axis-aligned filled rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    [
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Four bars along the inside of `min..max`
pub fn rect_outline(min: Vec2, max: Vec2, thickness: f32, color: [f32; 4]) -> Vec<Vertex> {
    let t = thickness.min((max.x - min.x) / 2.0).min((max.y - min.y) / 2.0);
    let mut vertices = Vec::with_capacity(24);

    // Top and bottom span the full width, sides fill the gap between them
    vertices.extend(rect(min, Vec2::new(max.x, min.y + t), color));
    vertices.extend(rect(Vec2::new(min.x, max.y - t), max, color));
    vertices.extend(rect(Vec2::new(min.x, min.y + t), Vec2::new(min.x + t, max.y - t), color));
    vertices.extend(rect(Vec2::new(max.x - t, min.y + t), Vec2::new(max.x, max.y - t), color));

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 4] = [1.0; 4];

    fn bounds(vertices: &[Vertex]) -> (Vec2, Vec2) {
        vertices.iter().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(lo, hi), v| {
                let p = Vec2::from(v.position);
                (lo.min(p), hi.max(p))
            },
        )
    }

    #[test]
    fn test_circle_stays_within_radius() {
        let center = Vec2::new(750.0, 250.0);
        let vertices = circle(center, 20.0, WHITE, 16);
        assert_eq!(vertices.len(), 48);
        for v in &vertices {
            assert!(Vec2::from(v.position).distance(center) <= 20.0 + 1e-3);
        }
    }

    #[test]
    fn test_ring_between_radii() {
        let vertices = ring(Vec2::ZERO, 50.0, 60.0, WHITE, 8);
        assert_eq!(vertices.len(), 48);
        for v in &vertices {
            let d = Vec2::from(v.position).length();
            assert!(d >= 50.0 - 1e-3 && d <= 60.0 + 1e-3);
        }
    }

    #[test]
    fn test_rect_outline_covers_bounds() {
        let vertices = rect_outline(Vec2::ZERO, Vec2::splat(1000.0), 4.0, WHITE);
        assert_eq!(vertices.len(), 24);
        let (lo, hi) = bounds(&vertices);
        assert_eq!(lo, Vec2::ZERO);
        assert_eq!(hi, Vec2::splat(1000.0));

        // Nothing in the interior
        for v in &vertices {
            let p = Vec2::from(v.position);
            let inside = p.x > 4.0 && p.x < 996.0 && p.y > 4.0 && p.y < 996.0;
            assert!(!inside, "vertex {:?} inside the outline", p);
        }
    }

    #[test]
    fn test_tessellate_appends() {
        let mut out = Vec::new();
        Shape::Triangle([Vec2::ZERO, Vec2::X, Vec2::Y]).tessellate(WHITE, &mut out);
        Shape::Rect {
            min: Vec2::ZERO,
            max: Vec2::ONE,
        }
        .tessellate(WHITE, &mut out);
        assert_eq!(out.len(), 9);
        assert_eq!(out[1].position, [1.0, 0.0]);
    }
}
