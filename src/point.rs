//! Concrete 2D point and axis-aligned bounding box.
//!
//! The teacher's `Point<T, const N: usize>` is generic over the scalar
//! ring; this crate only ever triangulates `f64` coordinates, so the
//! const-generic machinery is dropped in favor of a plain two-field
//! struct. Equality on points is deliberately *not* derived: two points
//! are never compared structurally, only through [`Point::dist2`] against
//! an epsilon (see `PSLG` normalization and `Mesh::add_vertex`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub fn new(x: f64, y: f64) -> Point {
    Point { x, y }
  }

  pub fn is_finite(&self) -> bool {
    self.x.is_finite() && self.y.is_finite()
  }

  /// Squared Euclidean distance. Used everywhere epsilon comparisons are
  /// required instead of structural equality.
  pub fn dist2(&self, other: &Point) -> f64 {
    let dx = self.x - other.x;
    let dy = self.y - other.y;
    dx * dx + dy * dy
  }

  pub fn sub(&self, other: &Point) -> (f64, f64) {
    (self.x - other.x, self.y - other.y)
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
  pub min: Point,
  pub max: Point,
}

impl Aabb {
  pub fn of_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Aabb> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let mut aabb = Aabb { min: *first, max: *first };
    for p in iter {
      aabb.min.x = aabb.min.x.min(p.x);
      aabb.min.y = aabb.min.y.min(p.y);
      aabb.max.x = aabb.max.x.max(p.x);
      aabb.max.y = aabb.max.y.max(p.y);
    }
    Some(aabb)
  }

  pub fn inflate(&self, margin: f64) -> Aabb {
    Aabb {
      min: Point::new(self.min.x - margin, self.min.y - margin),
      max: Point::new(self.max.x + margin, self.max.y + margin),
    }
  }

  pub fn span(&self) -> f64 {
    let w = self.max.x - self.min.x;
    let h = self.max.y - self.min.y;
    w.max(h)
  }

  pub fn contains(&self, p: &Point, eps: f64) -> bool {
    p.x >= self.min.x - eps && p.x <= self.max.x + eps && p.y >= self.min.y - eps && p.y <= self.max.y + eps
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dist2_is_symmetric() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(3.0, 4.0);
    assert_eq!(a.dist2(&b), 25.0);
    assert_eq!(a.dist2(&b), b.dist2(&a));
  }

  #[test]
  fn aabb_of_points_inflates_correctly() {
    let pts = [Point::new(0.0, 0.0), Point::new(10.0, 4.0), Point::new(-2.0, 6.0)];
    let aabb = Aabb::of_points(&pts).unwrap();
    assert_eq!(aabb.min, Point::new(-2.0, 0.0));
    assert_eq!(aabb.max, Point::new(10.0, 6.0));
    let inflated = aabb.inflate(1.0);
    assert_eq!(inflated.min, Point::new(-3.0, -1.0));
    assert_eq!(inflated.max, Point::new(11.0, 7.0));
  }
}
