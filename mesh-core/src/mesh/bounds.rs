//! Axis-aligned bounding box

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounds stored as center and half-size
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub center: Vec3,
    pub extents: Vec3,
}

impl Bounds {
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        Self { center, extents }
    }

    /// Build bounds from corner points
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        }
    }

    /// Tight bounds around a point set
    ///
    /// An empty set yields zero bounds at the origin.
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(&first) = points.first() else {
            return Self::default();
        };
        let (min, max) = points[1..]
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Self::from_min_max(min, max)
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    pub fn size(&self) -> Vec3 {
        self.extents * 2.0
    }

    /// Check whether a point lies inside or on the box
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min()).all() && point.cmple(self.max()).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bounds = Bounds::from_points(&[
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(3.0, 4.0, 2.0),
            Vec3::new(1.0, -2.0, 6.0),
        ]);
        assert_eq!(bounds.min(), Vec3::new(-1.0, -2.0, 2.0));
        assert_eq!(bounds.max(), Vec3::new(3.0, 4.0, 6.0));
        assert_eq!(bounds.center, Vec3::new(1.0, 1.0, 4.0));
        assert_eq!(bounds.size(), Vec3::new(4.0, 6.0, 4.0));
    }

    #[test]
    fn test_from_points_empty() {
        assert_eq!(Bounds::from_points(&[]), Bounds::default());
    }

    #[test]
    fn test_single_point() {
        let p = Vec3::new(2.0, -3.0, 0.5);
        let bounds = Bounds::from_points(&[p]);
        assert_eq!(bounds.center, p);
        assert_eq!(bounds.extents, Vec3::ZERO);
        assert!(bounds.contains(p));
    }

    #[test]
    fn test_contains() {
        let bounds = Bounds::from_min_max(Vec3::ZERO, Vec3::ONE);
        assert!(bounds.contains(Vec3::splat(0.5)));
        assert!(bounds.contains(Vec3::ONE));
        assert!(!bounds.contains(Vec3::new(1.5, 0.5, 0.5)));
    }
}
