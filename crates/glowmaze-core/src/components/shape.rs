use glam::Vec2;
use rapier2d::prelude::*;

/// Shape description for an entity's fixtures.
///
/// The descriptor outlives any live collider built from it: rebuilding a
/// dirty entity destroys the body's colliders and reconstructs them from
/// this value.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeDesc {
    Circle { radius: f32 },
    /// Convex polygon given as a counter-clockwise point loop.
    Polygon { points: Vec<Vec2> },
}

impl ShapeDesc {
    /// Axis-aligned square centered on the origin.
    pub fn square(half: f32) -> Self {
        Self::rect(half, half)
    }

    /// Axis-aligned rectangle centered on the origin.
    pub fn rect(half_width: f32, half_height: f32) -> Self {
        ShapeDesc::Polygon {
            points: vec![
                Vec2::new(-half_width, -half_height),
                Vec2::new(half_width, -half_height),
                Vec2::new(half_width, half_height),
                Vec2::new(-half_width, half_height),
            ],
        }
    }

    /// Whether colliders can be built from this descriptor.
    pub fn is_valid(&self) -> bool {
        match self {
            ShapeDesc::Circle { radius } => *radius > 0.0,
            ShapeDesc::Polygon { points } => points.len() >= 3,
        }
    }

    /// Build the collider(s) for this shape.
    ///
    /// Returns `None` for degenerate shapes (zero radius, fewer than three
    /// points, or a failed convex hull) — the caller treats that as a
    /// recoverable activation failure, not a panic.
    pub(crate) fn collider_builders(&self) -> Option<Vec<ColliderBuilder>> {
        match self {
            ShapeDesc::Circle { radius } => {
                if *radius > 0.0 {
                    Some(vec![ColliderBuilder::ball(*radius)])
                } else {
                    None
                }
            }
            ShapeDesc::Polygon { points } => {
                if points.len() < 3 {
                    return None;
                }
                let hull: Vec<nalgebra::Point2<f32>> = points
                    .iter()
                    .map(|p| nalgebra::Point2::new(p.x, p.y))
                    .collect();
                ColliderBuilder::convex_hull(&hull).map(|b| vec![b])
            }
        }
    }

    /// Closed outline of the shape translated to `center`, for debug drawing.
    pub fn outline(&self, center: Vec2) -> Vec<Vec2> {
        match self {
            ShapeDesc::Circle { radius } => {
                let segments = 24;
                let mut points = Vec::with_capacity(segments + 1);
                for i in 0..=segments {
                    let angle = (i as f32 / segments as f32) * std::f32::consts::TAU;
                    points.push(center + Vec2::new(angle.cos(), angle.sin()) * *radius);
                }
                points
            }
            ShapeDesc::Polygon { points } => {
                let mut outline: Vec<Vec2> = points.iter().map(|p| center + *p).collect();
                if let Some(first) = outline.first().copied() {
                    outline.push(first);
                }
                outline
            }
        }
    }
}
