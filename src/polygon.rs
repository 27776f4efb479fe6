//! `PolygonLoop`: an ordered vertex-index ring with orientation and a
//! reversal operation. Geometric polygon math (area, self-intersection,
//! point-in-polygon) lives in [`crate::predicates`] and operates on raw
//! coordinate slices; this type is the indexed bookkeeping layer on top.

use crate::mesh::VertexId;
use crate::point::Point;
use crate::predicates::polygon_signed_area;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolygonLoop {
  pub vertices: Vec<VertexId>,
}

impl PolygonLoop {
  pub fn new(vertices: Vec<VertexId>) -> PolygonLoop {
    PolygonLoop { vertices }
  }

  pub fn len(&self) -> usize {
    self.vertices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  pub fn reversed(&self) -> PolygonLoop {
    let mut v = self.vertices.clone();
    v.reverse();
    PolygonLoop::new(v)
  }

  /// Consecutive (wrap-around) vertex-index pairs forming the loop's edges.
  pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
    let n = self.vertices.len();
    (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
  }

  pub fn signed_area(&self, coords: impl Fn(VertexId) -> Point) -> f64 {
    let pts: Vec<Point> = self.vertices.iter().map(|&v| coords(v)).collect();
    polygon_signed_area(&pts)
  }
}
