//! JSON persistence for reproducing bug reports: a single document with
//! `vertices`/`perimeters`/`holes`/`triangles`/`config`. The wire DTO is
//! kept distinct from [`Mesh`] so the snake_case field names don't leak
//! `#[serde(rename)]` attributes onto the in-memory hot-path type.

use serde::{Deserialize, Serialize};

use crate::mesh::{Mesh, MeshOptions, VertexId};
use crate::point::Point;
use crate::polygon::PolygonLoop;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshConfigDocument {
  pub epsilon: f64,
  pub merge_vertices: bool,
  pub merge_distance: Option<f64>,
  pub validate_vertex_inside: bool,
  pub validate_edge_intersection: bool,
  pub validate_edge_cannot_cross_perimeter: bool,
  pub error_on_duplicate_triangle: bool,
  pub error_on_opposing_duplicate: bool,
  /// Not named in the original wire-format listing; defaulted to `false`
  /// so documents written before this field existed still load.
  #[serde(default)]
  pub overlap_triangle_area: bool,
}

impl From<MeshOptions> for MeshConfigDocument {
  fn from(o: MeshOptions) -> MeshConfigDocument {
    MeshConfigDocument {
      epsilon: o.epsilon,
      merge_vertices: o.merge_vertices,
      merge_distance: o.merge_distance,
      validate_vertex_inside: o.validate_vertex_inside,
      validate_edge_intersection: o.validate_edge_intersection,
      validate_edge_cannot_cross_perimeter: o.validate_edge_cannot_cross_perimeter,
      error_on_duplicate_triangle: o.error_on_duplicate_triangle,
      error_on_opposing_duplicate: o.error_on_opposing_duplicate,
      overlap_triangle_area: o.overlap_triangle_area,
    }
  }
}

impl From<MeshConfigDocument> for MeshOptions {
  fn from(c: MeshConfigDocument) -> MeshOptions {
    MeshOptions {
      epsilon: c.epsilon,
      merge_vertices: c.merge_vertices,
      merge_distance: c.merge_distance,
      validate_vertex_inside: c.validate_vertex_inside,
      validate_edge_intersection: c.validate_edge_intersection,
      validate_edge_cannot_cross_perimeter: c.validate_edge_cannot_cross_perimeter,
      error_on_duplicate_triangle: c.error_on_duplicate_triangle,
      error_on_opposing_duplicate: c.error_on_opposing_duplicate,
      overlap_triangle_area: c.overlap_triangle_area,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDocument {
  pub vertices: Vec<Point>,
  pub perimeters: Vec<Vec<usize>>,
  pub holes: Vec<Vec<usize>>,
  pub triangles: Vec<[usize; 3]>,
  pub config: MeshConfigDocument,
}

impl MeshDocument {
  pub fn from_mesh(mesh: &Mesh) -> MeshDocument {
    let vertices = (0..mesh.vertex_count()).map(|i| mesh.vertex(VertexId(i))).collect();
    let to_ids = |p: &PolygonLoop| p.vertices.iter().map(|v| v.0).collect();
    MeshDocument {
      vertices,
      perimeters: mesh.perimeters().iter().map(to_ids).collect(),
      holes: mesh.holes().iter().map(to_ids).collect(),
      triangles: mesh.triangles().iter().map(|t| [t[0].0, t[1].0, t[2].0]).collect(),
      config: MeshConfigDocument::from(*mesh.options()),
    }
  }

  pub fn into_mesh(self) -> Mesh {
    let options = MeshOptions::from(self.config);
    let vertices = self.vertices;
    let triangles: Vec<[VertexId; 3]> = self.triangles.iter().map(|t| [VertexId(t[0]), VertexId(t[1]), VertexId(t[2])]).collect();
    let to_loop = |ids: Vec<usize>| PolygonLoop::new(ids.into_iter().map(VertexId).collect());
    let perimeters = self.perimeters.into_iter().map(to_loop).collect();
    let holes = self.holes.into_iter().map(to_loop).collect();
    Mesh::restore(options, vertices, triangles, perimeters, holes)
  }
}

pub fn save_json(mesh: &Mesh) -> Result<String, serde_json::Error> {
  serde_json::to_string_pretty(&MeshDocument::from_mesh(mesh))
}

pub fn load_json(text: &str) -> Result<Mesh, serde_json::Error> {
  let doc: MeshDocument = serde_json::from_str(text)?;
  Ok(doc.into_mesh())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_a_small_mesh() {
    let mut mesh = Mesh::new(MeshOptions::default());
    let a = mesh.add_vertex(Point::new(0.0, 0.0));
    let b = mesh.add_vertex(Point::new(10.0, 0.0));
    let c = mesh.add_vertex(Point::new(0.0, 10.0));
    mesh.add_triangle(a, b, c).unwrap();

    let json = save_json(&mesh).unwrap();
    let restored = load_json(&json).unwrap();
    assert_eq!(restored.vertex_count(), mesh.vertex_count());
    assert_eq!(restored.triangles(), mesh.triangles());
  }

  #[test]
  fn restored_document_is_byte_stable_on_second_save() {
    let mut mesh = Mesh::new(MeshOptions::default());
    let a = mesh.add_vertex(Point::new(0.0, 0.0));
    let b = mesh.add_vertex(Point::new(10.0, 0.0));
    let c = mesh.add_vertex(Point::new(0.0, 10.0));
    mesh.add_triangle(a, b, c).unwrap();

    let first = save_json(&mesh).unwrap();
    let restored = load_json(&first).unwrap();
    let second = save_json(&restored).unwrap();
    assert_eq!(first, second);
  }
}
