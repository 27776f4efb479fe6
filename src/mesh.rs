//! The Validated Mesh: the crate's output container, and an independent
//! API for building meshes by hand under the same validation rules the
//! builder relies on. Grounded on the teacher's `TriangularNetwork`
//! bookkeeping (vertex list + edge map + per-triangle record) but with
//! the validation gauntlet from AddTriangle genuinely enforced rather
//! than assumed, since here the caller is not guaranteed to be a
//! Delaunay-correct algorithm.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::point::Point;
use crate::polygon::PolygonLoop;
use crate::predicates::{point_in_polygon, point_strictly_in_triangle, polygon_self_intersects, segment_intersect, triangle_intersection_area};
use crate::spatial::{HashGridIndex, SpatialIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
  pub epsilon: f64,
  pub merge_vertices: bool,
  pub merge_distance: Option<f64>,
  pub validate_vertex_inside: bool,
  pub validate_edge_intersection: bool,
  pub validate_edge_cannot_cross_perimeter: bool,
  pub error_on_duplicate_triangle: bool,
  pub error_on_opposing_duplicate: bool,
  pub overlap_triangle_area: bool,
}

impl Default for MeshOptions {
  fn default() -> MeshOptions {
    MeshOptions {
      epsilon: 1e-9,
      merge_vertices: false,
      merge_distance: None,
      validate_vertex_inside: true,
      validate_edge_intersection: true,
      validate_edge_cannot_cross_perimeter: true,
      error_on_duplicate_triangle: true,
      error_on_opposing_duplicate: true,
      overlap_triangle_area: false,
    }
  }
}

impl MeshOptions {
  fn resolved_merge_distance(&self) -> f64 {
    self.merge_distance.unwrap_or(self.epsilon)
  }
}

pub type EdgeKey = (VertexId, VertexId);

fn canonical_edge(a: VertexId, b: VertexId) -> EdgeKey {
  if a.0 < b.0 {
    (a, b)
  } else {
    (b, a)
  }
}

fn canonical_triple(v: [VertexId; 3]) -> [VertexId; 3] {
  let mut v = v;
  v.sort();
  v
}

fn signed_area2(a: Point, b: Point, c: Point) -> f64 {
  ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)) / 2.0
}

pub struct Mesh {
  options: MeshOptions,
  vertices: Vec<Point>,
  triangles: Vec<[VertexId; 3]>,
  edge_owners: HashMap<EdgeKey, usize>,
  canonical_tri_set: HashMap<[VertexId; 3], Vec<usize>>,
  perimeters: Vec<PolygonLoop>,
  holes: Vec<PolygonLoop>,
  spatial: Box<dyn SpatialIndex>,
  on_vertex: Option<Box<dyn FnMut(VertexId, Point)>>,
  on_edge: Option<Box<dyn FnMut(VertexId, VertexId)>>,
  on_triangle: Option<Box<dyn FnMut(VertexId, VertexId, VertexId)>>,
}

impl Mesh {
  pub fn new(options: MeshOptions) -> Mesh {
    let cell = options.resolved_merge_distance().max(options.epsilon).max(1e-6) * 4.0;
    Mesh::with_spatial_index(options, Box::new(HashGridIndex::new(cell)))
  }

  pub fn with_spatial_index(options: MeshOptions, spatial: Box<dyn SpatialIndex>) -> Mesh {
    Mesh {
      options,
      vertices: Vec::new(),
      triangles: Vec::new(),
      edge_owners: HashMap::new(),
      canonical_tri_set: HashMap::new(),
      perimeters: Vec::new(),
      holes: Vec::new(),
      spatial,
      on_vertex: None,
      on_edge: None,
      on_triangle: None,
    }
  }

  /// Rebuild a `Mesh` directly from already-validated state, without
  /// re-running any of [`Mesh::add_triangle`]'s checks. Used by
  /// [`crate::persistence`] to restore a saved document verbatim.
  pub fn restore(
    options: MeshOptions,
    vertices: Vec<Point>,
    triangles: Vec<[VertexId; 3]>,
    perimeters: Vec<PolygonLoop>,
    holes: Vec<PolygonLoop>,
  ) -> Mesh {
    let mut mesh = Mesh::new(options);
    for &p in &vertices {
      mesh.spatial.add(VertexId(mesh.vertices.len()), p);
      mesh.vertices.push(p);
    }
    for t in triangles {
      let key = canonical_triple(t);
      let idx = mesh.triangles.len();
      mesh.canonical_tri_set.entry(key).or_default().push(idx);
      for &(a, b) in &[(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
        *mesh.edge_owners.entry(canonical_edge(a, b)).or_insert(0) += 1;
      }
      mesh.triangles.push(t);
    }
    mesh.perimeters = perimeters;
    mesh.holes = holes;
    mesh
  }

  pub fn options(&self) -> &MeshOptions {
    &self.options
  }

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.triangles.len()
  }

  pub fn vertex(&self, id: VertexId) -> Point {
    self.vertices[id.0]
  }

  pub fn triangles(&self) -> &[[VertexId; 3]] {
    &self.triangles
  }

  pub fn perimeters(&self) -> &[PolygonLoop] {
    &self.perimeters
  }

  pub fn holes(&self) -> &[PolygonLoop] {
    &self.holes
  }

  pub fn set_vertex_hook(&mut self, f: impl FnMut(VertexId, Point) + 'static) {
    self.on_vertex = Some(Box::new(f));
  }

  pub fn set_edge_hook(&mut self, f: impl FnMut(VertexId, VertexId) + 'static) {
    self.on_edge = Some(Box::new(f));
  }

  pub fn set_triangle_hook(&mut self, f: impl FnMut(VertexId, VertexId, VertexId) + 'static) {
    self.on_triangle = Some(Box::new(f));
  }

  /// Returns an existing vertex within `mergeDistance` when merging is
  /// enabled, otherwise appends `p` as a fresh vertex. Infallible: there
  /// is no rejection path for a bare coordinate.
  pub fn add_vertex(&mut self, p: Point) -> VertexId {
    if self.options.merge_vertices {
      if let Some(candidate) = self.find_vertex_near(p) {
        if let Some(hook) = &mut self.on_vertex {
          hook(candidate, p);
        }
        return candidate;
      }
    }
    let id = VertexId(self.vertices.len());
    self.vertices.push(p);
    self.spatial.add(id, p);
    if let Some(hook) = &mut self.on_vertex {
      hook(id, p);
    }
    id
  }

  /// The first existing vertex within `mergeDistance` of `p`, without
  /// inserting one when none is found. Shares its search logic with
  /// [`Mesh::add_vertex`]'s merge check.
  pub fn find_vertex_near(&self, p: Point) -> Option<VertexId> {
    let r = self.options.resolved_merge_distance();
    let mut hits = self.spatial.find_near(p, r);
    hits.sort();
    hits.into_iter().find(|candidate| p.dist2(&self.vertices[candidate.0]) <= r * r)
  }

  fn check_id(&self, id: VertexId) -> Result<(), MeshError> {
    if id.0 >= self.vertices.len() {
      Err(MeshError::InvalidVertexId(id))
    } else {
      Ok(())
    }
  }

  pub fn triangle_coords(&self, t: [VertexId; 3]) -> [Point; 3] {
    [self.vertices[t[0].0], self.vertices[t[1].0], self.vertices[t[2].0]]
  }

  /// The canonical `(min, max)` edges currently present in the mesh.
  pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
    self.edge_owners.keys().copied()
  }

  /// How many triangles currently own edge `(a, b)` (0, 1, or 2).
  pub fn edge_count(&self, a: VertexId, b: VertexId) -> usize {
    self.edge_owners.get(&canonical_edge(a, b)).copied().unwrap_or(0)
  }

  /// Run the configured validation gauntlet and, on success, record the
  /// triangle and its edges. Validations run in the order documented on
  /// [`MeshOptions`]; the first failing one wins.
  pub fn add_triangle(&mut self, v1: VertexId, v2: VertexId, v3: VertexId) -> Result<usize, MeshError> {
    self.check_id(v1)?;
    self.check_id(v2)?;
    self.check_id(v3)?;

    let p = [self.vertices[v1.0], self.vertices[v2.0], self.vertices[v3.0]];
    let area = signed_area2(p[0], p[1], p[2]);
    if area.abs() <= self.options.epsilon {
      return Err(MeshError::DegenerateTriangle);
    }

    if self.options.validate_vertex_inside {
      self.check_no_vertex_inside(v1, v2, v3, p)?;
    }
    if self.options.validate_edge_intersection {
      self.check_edge_intersections(v1, v2, v3, p)?;
    }
    if self.options.validate_edge_cannot_cross_perimeter {
      self.check_edges_vs_boundaries(v1, v2, v3, p)?;
    }
    let key = canonical_triple([v1, v2, v3]);
    if self.options.error_on_duplicate_triangle || self.options.error_on_opposing_duplicate {
      self.check_duplicate(&key, area)?;
    }
    if self.options.overlap_triangle_area {
      self.check_overlap(p)?;
    }

    let idx = self.triangles.len();
    self.triangles.push([v1, v2, v3]);
    self.canonical_tri_set.entry(key).or_default().push(idx);

    for &(a, b) in &[(v1, v2), (v2, v3), (v3, v1)] {
      let ekey = canonical_edge(a, b);
      let was_new = !self.edge_owners.contains_key(&ekey);
      *self.edge_owners.entry(ekey).or_insert(0) += 1;
      if was_new {
        if let Some(hook) = &mut self.on_edge {
          hook(ekey.0, ekey.1);
        }
      }
    }
    if let Some(hook) = &mut self.on_triangle {
      hook(v1, v2, v3);
    }
    Ok(idx)
  }

  fn check_no_vertex_inside(&self, v1: VertexId, v2: VertexId, v3: VertexId, p: [Point; 3]) -> Result<(), MeshError> {
    let centroid = Point::new((p[0].x + p[1].x + p[2].x) / 3.0, (p[0].y + p[1].y + p[2].y) / 3.0);
    let radius = p.iter().map(|q| centroid.dist2(q).sqrt()).fold(0.0_f64, f64::max);
    for candidate in self.spatial.find_near(centroid, radius) {
      if candidate == v1 || candidate == v2 || candidate == v3 {
        continue;
      }
      if point_strictly_in_triangle(&self.vertices[candidate.0], &p[0], &p[1], &p[2]) {
        return Err(MeshError::VertexInsideTriangle);
      }
    }
    Ok(())
  }

  fn check_edge_intersections(&self, v1: VertexId, v2: VertexId, v3: VertexId, p: [Point; 3]) -> Result<(), MeshError> {
    let new_edges = [(v1, v2, p[0], p[1]), (v2, v3, p[1], p[2]), (v3, v1, p[2], p[0])];
    for &(a, b, ..) in &new_edges {
      if self.edge_owners.get(&canonical_edge(a, b)).copied().unwrap_or(0) >= 2 {
        return Err(MeshError::EdgeIntersection);
      }
    }
    for (&(ea, eb), _) in self.edge_owners.iter() {
      let (qa, qb) = (self.vertices[ea.0], self.vertices[eb.0]);
      for &(a, b, pa, pb) in &new_edges {
        if (a == ea && b == eb) || (a == eb && b == ea) {
          continue;
        }
        let hit = segment_intersect(&pa, &pb, &qa, &qb);
        if hit.hits && !(hit.t == 0.0 || hit.t == 1.0) && !(hit.u == 0.0 || hit.u == 1.0) {
          return Err(MeshError::EdgeIntersection);
        }
      }
    }
    Ok(())
  }

  fn check_edges_vs_boundaries(&self, v1: VertexId, v2: VertexId, v3: VertexId, p: [Point; 3]) -> Result<(), MeshError> {
    let new_edges = [(v1, v2, p[0], p[1]), (v2, v3, p[1], p[2]), (v3, v1, p[2], p[0])];
    for loop_ in self.perimeters.iter().chain(self.holes.iter()) {
      for (ea, eb) in loop_.edges() {
        let (qa, qb) = (self.vertices[ea.0], self.vertices[eb.0]);
        for &(a, b, pa, pb) in &new_edges {
          if (a == ea && b == eb) || (a == eb && b == ea) {
            continue;
          }
          let hit = segment_intersect(&pa, &pb, &qa, &qb);
          if hit.hits && !(hit.t == 0.0 || hit.t == 1.0) && !(hit.u == 0.0 || hit.u == 1.0) {
            return Err(MeshError::EdgeCrossesPerimeter);
          }
        }
      }
    }
    Ok(())
  }

  fn check_duplicate(&self, key: &[VertexId; 3], area: f64) -> Result<(), MeshError> {
    let Some(existing) = self.canonical_tri_set.get(key) else { return Ok(()) };
    if existing.is_empty() {
      return Ok(());
    }
    if self.options.error_on_duplicate_triangle {
      return Err(MeshError::DuplicateTriangle);
    }
    if self.options.error_on_opposing_duplicate {
      for &idx in existing {
        let other = self.triangle_coords(self.triangles[idx]);
        let other_area = signed_area2(other[0], other[1], other[2]);
        if other_area.signum() != area.signum() {
          return Err(MeshError::OpposingWindingDuplicate);
        }
      }
    }
    Ok(())
  }

  fn check_overlap(&self, p: [Point; 3]) -> Result<(), MeshError> {
    for &t in &self.triangles {
      let other = self.triangle_coords(t);
      if triangle_intersection_area(p, other) > self.options.epsilon {
        return Err(MeshError::TriangleOverlap);
      }
    }
    Ok(())
  }

  fn coords_of(&self, loop_: &PolygonLoop) -> Vec<Point> {
    loop_.vertices.iter().map(|&v| self.vertices[v.0]).collect()
  }

  fn loop_properly_intersects(&self, coords: &[Point], other: &PolygonLoop) -> bool {
    let other_coords = self.coords_of(other);
    let n = coords.len();
    let m = other_coords.len();
    for i in 0..n {
      let (a1, a2) = (coords[i], coords[(i + 1) % n]);
      for j in 0..m {
        let (b1, b2) = (other_coords[j], other_coords[(j + 1) % m]);
        let hit = segment_intersect(&a1, &a2, &b1, &b2);
        if hit.hits && !(hit.t == 0.0 || hit.t == 1.0) && !(hit.u == 0.0 || hit.u == 1.0) {
          return true;
        }
      }
    }
    false
  }

  pub fn add_perimeter(&mut self, points: &[Point]) -> Result<usize, MeshError> {
    let ids: Vec<VertexId> = points.iter().map(|&p| self.add_vertex(p)).collect();
    let poly = PolygonLoop::new(ids);
    let coords = self.coords_of(&poly);
    if polygon_self_intersects(&coords) {
      return Err(MeshError::SelfIntersectingLoop);
    }
    for existing in &self.perimeters {
      if self.loop_properly_intersects(&coords, existing) {
        return Err(MeshError::PerimeterIntersectsPerimeter);
      }
    }
    self.perimeters.push(poly);
    Ok(self.perimeters.len() - 1)
  }

  pub fn add_hole(&mut self, points: &[Point]) -> Result<usize, MeshError> {
    let ids: Vec<VertexId> = points.iter().map(|&p| self.add_vertex(p)).collect();
    let poly = PolygonLoop::new(ids);
    let coords = self.coords_of(&poly);
    if polygon_self_intersects(&coords) {
      return Err(MeshError::SelfIntersectingLoop);
    }

    let mut containing = 0;
    for perimeter in &self.perimeters {
      let p_coords = self.coords_of(perimeter);
      if coords.iter().all(|p| point_in_polygon(p, &p_coords, self.options.epsilon)) {
        containing += 1;
      }
    }
    if containing != 1 {
      return Err(MeshError::HoleOutsidePerimeter);
    }

    for existing in self.perimeters.iter().chain(self.holes.iter()) {
      if self.loop_properly_intersects(&coords, existing) {
        return Err(MeshError::EdgeCrossesPerimeter);
      }
    }
    for hole in &self.holes {
      let h_coords = self.coords_of(hole);
      let new_inside_old = coords.iter().any(|p| point_in_polygon(p, &h_coords, self.options.epsilon));
      let old_inside_new = h_coords.iter().any(|p| point_in_polygon(p, &coords, self.options.epsilon));
      if new_inside_old || old_inside_new {
        return Err(MeshError::HoleOverlapsHole);
      }
    }

    self.holes.push(poly);
    Ok(self.holes.len() - 1)
  }

  pub fn boundary_edges(&self) -> Vec<EdgeKey> {
    self.edge_owners.iter().filter(|&(_, &count)| count == 1).map(|(&k, _)| k).collect()
  }

  pub fn untriangulated_vertices(&self) -> HashSet<VertexId> {
    let triangulated: HashSet<VertexId> = self.triangles.iter().flatten().copied().collect();
    let mut boundary = HashSet::new();
    for loop_ in self.perimeters.iter().chain(self.holes.iter()) {
      boundary.extend(loop_.vertices.iter().copied());
    }
    boundary.difference(&triangulated).copied().collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_vertex_merges_within_distance() {
    let mut opts = MeshOptions::default();
    opts.merge_vertices = true;
    opts.merge_distance = Some(0.5);
    let mut mesh = Mesh::new(opts);
    let a = mesh.add_vertex(Point::new(0.0, 0.0));
    let b = mesh.add_vertex(Point::new(0.1, 0.1));
    assert_eq!(a, b);
    assert_eq!(mesh.vertex_count(), 1);
  }

  #[test]
  fn add_triangle_rejects_degenerate() {
    let mut mesh = Mesh::new(MeshOptions::default());
    let a = mesh.add_vertex(Point::new(0.0, 0.0));
    let b = mesh.add_vertex(Point::new(1.0, 0.0));
    let c = mesh.add_vertex(Point::new(2.0, 0.0));
    assert_eq!(mesh.add_triangle(a, b, c), Err(MeshError::DegenerateTriangle));
  }

  #[test]
  fn add_triangle_rejects_duplicate() {
    let mut mesh = Mesh::new(MeshOptions::default());
    let a = mesh.add_vertex(Point::new(0.0, 0.0));
    let b = mesh.add_vertex(Point::new(10.0, 0.0));
    let c = mesh.add_vertex(Point::new(0.0, 10.0));
    mesh.add_triangle(a, b, c).unwrap();
    assert_eq!(mesh.add_triangle(a, c, b), Err(MeshError::DuplicateTriangle));
  }

  #[test]
  fn add_triangle_rejects_vertex_strictly_inside() {
    let mut mesh = Mesh::new(MeshOptions::default());
    let a = mesh.add_vertex(Point::new(0.0, 0.0));
    let b = mesh.add_vertex(Point::new(10.0, 0.0));
    let c = mesh.add_vertex(Point::new(0.0, 10.0));
    let _inner = mesh.add_vertex(Point::new(2.0, 2.0));
    assert_eq!(mesh.add_triangle(a, b, c), Err(MeshError::VertexInsideTriangle));
  }

  #[test]
  fn boundary_edges_reports_count_one_edges() {
    let mut mesh = Mesh::new(MeshOptions::default());
    let a = mesh.add_vertex(Point::new(0.0, 0.0));
    let b = mesh.add_vertex(Point::new(10.0, 0.0));
    let c = mesh.add_vertex(Point::new(10.0, 10.0));
    let d = mesh.add_vertex(Point::new(0.0, 10.0));
    mesh.add_triangle(a, b, c).unwrap();
    mesh.add_triangle(a, c, d).unwrap();
    assert_eq!(mesh.boundary_edges().len(), 4);
    assert_eq!(mesh.edges().count(), 5);
    assert_eq!(mesh.edge_count(a, c), 2);
    assert_eq!(mesh.edge_count(a, b), 1);
  }

  #[test]
  fn find_vertex_near_does_not_insert() {
    let mut opts = MeshOptions::default();
    opts.merge_vertices = true;
    opts.merge_distance = Some(0.5);
    let mut mesh = Mesh::new(opts);
    let a = mesh.add_vertex(Point::new(0.0, 0.0));
    assert_eq!(mesh.find_vertex_near(Point::new(0.1, 0.1)), Some(a));
    assert_eq!(mesh.find_vertex_near(Point::new(5.0, 5.0)), None);
    assert_eq!(mesh.vertex_count(), 1);
  }

  #[test]
  fn add_hole_requires_single_containing_perimeter() {
    let mut mesh = Mesh::new(MeshOptions::default());
    let outer = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
    mesh.add_perimeter(&outer).unwrap();
    let hole = [Point::new(20.0, 20.0), Point::new(21.0, 20.0), Point::new(21.0, 21.0)];
    assert_eq!(mesh.add_hole(&hole), Err(MeshError::HoleOutsidePerimeter));
  }
}
