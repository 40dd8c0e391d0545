//! Small planar/spatial helpers for the bundled checks.

use crate::map::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn from_point(p: &Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }

    pub fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Cosine of the angle between two vectors; `None` if either is zero.
    pub fn cosine(self, other: Vec3) -> Option<f64> {
        let denom = self.norm() * other.norm();
        (denom > f64::EPSILON).then(|| self.dot(other) / denom)
    }
}

/// Direction from the first to the last point.
pub(crate) fn direction(points: &[Point]) -> Option<Vec3> {
    let first = points.first()?;
    let last = points.last()?;
    Some(Vec3::from_point(last).sub(Vec3::from_point(first)))
}

/// Axis-aligned 2D bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoundingBox2d {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox2d {
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points.iter().fold(init, |b, p| Self {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    pub fn contains(&self, p: &Point) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_y..=self.max_y).contains(&p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point { id: 0, x, y, z: 0.0 }
    }

    #[test]
    fn test_bbox_contains_edges() {
        let bbox = BoundingBox2d::of(&[pt(0.0, 0.0), pt(2.0, 1.0), pt(1.0, 3.0)]).unwrap();
        assert!(bbox.contains(&pt(2.0, 3.0)));
        assert!(bbox.contains(&pt(1.0, 1.0)));
        assert!(!bbox.contains(&pt(2.1, 1.0)));
        assert!(BoundingBox2d::of(&[]).is_none());
    }

    #[test]
    fn test_cosine() {
        let a = direction(&[pt(0.0, 0.0), pt(1.0, 0.0)]).unwrap();
        let b = direction(&[pt(5.0, 5.0), pt(3.0, 5.0)]).unwrap();
        assert!((a.cosine(b).unwrap() + 1.0).abs() < 1e-9);
        assert!(a.cosine(Vec3 { x: 0.0, y: 0.0, z: 0.0 }).is_none());
    }
}
