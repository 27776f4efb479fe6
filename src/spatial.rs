//! The spatial index is a pluggable collaborator (§6): only this
//! contract is specified, any implementation satisfying it works. This
//! crate ships one concrete implementation, a uniform hash grid, as the
//! default used by [`crate::mesh::Mesh`].

use std::collections::HashMap;

use crate::mesh::VertexId;
use crate::point::Point;

pub trait SpatialIndex {
  /// May return false positives; must not miss a vertex within `r`.
  fn find_near(&self, p: Point, r: f64) -> Vec<VertexId>;
  fn add(&mut self, id: VertexId, p: Point);
  /// Optional finalization step for non-incremental implementations.
  fn build(&mut self) {}
}

/// Uniform hash grid keyed by cell coordinate. Cell size is fixed at
/// construction; callers who need adaptive cell sizing should implement
/// their own [`SpatialIndex`] instead.
pub struct HashGridIndex {
  cell_size: f64,
  cells: HashMap<(i64, i64), Vec<(VertexId, Point)>>,
}

impl HashGridIndex {
  pub fn new(cell_size: f64) -> HashGridIndex {
    HashGridIndex { cell_size: cell_size.max(1e-12), cells: HashMap::new() }
  }

  fn cell_of(&self, p: Point) -> (i64, i64) {
    ((p.x / self.cell_size).floor() as i64, (p.y / self.cell_size).floor() as i64)
  }
}

impl Default for HashGridIndex {
  fn default() -> HashGridIndex {
    HashGridIndex::new(1.0)
  }
}

impl SpatialIndex for HashGridIndex {
  fn find_near(&self, p: Point, r: f64) -> Vec<VertexId> {
    let (cx, cy) = self.cell_of(p);
    let radius_cells = (r / self.cell_size).ceil() as i64 + 1;
    let mut out = Vec::new();
    for dx in -radius_cells..=radius_cells {
      for dy in -radius_cells..=radius_cells {
        if let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) {
          for &(id, q) in bucket {
            if p.dist2(&q) <= r * r {
              out.push(id);
            }
          }
        }
      }
    }
    out
  }

  fn add(&mut self, id: VertexId, p: Point) {
    let key = self.cell_of(p);
    self.cells.entry(key).or_default().push((id, p));
  }
}
