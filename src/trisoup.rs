//! The triangulation workspace: an index-addressed "triangle soup" with
//! adjacency and an edge→triangle map, grounded on the teacher's
//! `TriangularNetwork`/`Triangle` pair (one live triangle array, no
//! pointer graph, neighbor links are plain `Option<TriIdx>` slots).

use std::collections::HashMap;

use log::trace;

use crate::point::Point;
use crate::predicates::orient2d;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VIdx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriIdx(pub usize);

/// Local index 0..3 of a triangle's vertex/opposite-edge slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubIdx(pub usize);

impl SubIdx {
  pub fn ccw(self) -> SubIdx {
    SubIdx((self.0 + 1) % 3)
  }
  pub fn cw(self) -> SubIdx {
    SubIdx((self.0 + 2) % 3)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
  pub tri: TriIdx,
  pub sub: SubIdx,
}

#[derive(Debug, Clone)]
pub struct Triangle {
  pub v: [VIdx; 3],
  pub n: [Option<TriIdx>; 3],
  deleted: bool,
}

impl Triangle {
  /// Vertex index opposite local edge `sub`, i.e. `V[sub]`.
  pub fn vert(&self, sub: SubIdx) -> VIdx {
    self.v[sub.0]
  }

  /// Endpoints of the edge opposite `V[sub]`: `(V[sub+1], V[sub+2])`.
  pub fn edge_verts(&self, sub: SubIdx) -> (VIdx, VIdx) {
    (self.v[sub.ccw().0], self.v[sub.cw().0])
  }
}

fn edge_key(a: VIdx, b: VIdx) -> (usize, usize) {
  if a.0 < b.0 {
    (a.0, b.0)
  } else {
    (b.0, a.0)
  }
}

#[derive(Debug, Default)]
pub struct TriSoup {
  vertices: Vec<Point>,
  triangles: Vec<Triangle>,
  free: Vec<TriIdx>,
  edge_map: HashMap<(usize, usize), Vec<(TriIdx, SubIdx)>>,
}

impl TriSoup {
  pub fn new() -> TriSoup {
    TriSoup::default()
  }

  pub fn add_vertex(&mut self, p: Point) -> VIdx {
    let id = VIdx(self.vertices.len());
    self.vertices.push(p);
    id
  }

  pub fn vertex(&self, v: VIdx) -> Point {
    self.vertices[v.0]
  }

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  pub fn tri(&self, t: TriIdx) -> &Triangle {
    &self.triangles[t.0]
  }

  pub fn is_live(&self, t: TriIdx) -> bool {
    t.0 < self.triangles.len() && !self.triangles[t.0].deleted
  }

  pub fn live_triangles(&self) -> impl Iterator<Item = TriIdx> + '_ {
    (0..self.triangles.len()).map(TriIdx).filter(move |&t| self.is_live(t))
  }

  /// Add a CCW triangle. If the caller passes vertices CW they are swapped.
  pub fn add_tri(&mut self, a: VIdx, b: VIdx, c: VIdx) -> TriIdx {
    let (a, b, c) = if orient2d(&self.vertices[a.0], &self.vertices[b.0], &self.vertices[c.0]) < 0 {
      (a, c, b)
    } else {
      (a, b, c)
    };
    let tri = Triangle { v: [a, b, c], n: [None, None, None], deleted: false };
    let idx = match self.free.pop() {
      Some(idx) => {
        self.triangles[idx.0] = tri;
        idx
      }
      None => {
        let idx = TriIdx(self.triangles.len());
        self.triangles.push(tri);
        idx
      }
    };
    for sub in 0..3 {
      self.register_edge(idx, SubIdx(sub));
    }
    idx
  }

  pub fn remove_tri(&mut self, t: TriIdx) {
    for sub in 0..3 {
      let sub = SubIdx(sub);
      if let Some(neighbor) = self.triangles[t.0].n[sub.0] {
        if self.is_live(neighbor) {
          if let Some(back) = self.find_tri_edge_by_verts(neighbor, self.triangles[t.0].edge_verts(sub)) {
            self.triangles[neighbor.0].n[back.0] = None;
          }
        }
      }
      self.unregister_edge(t, sub);
    }
    self.triangles[t.0].deleted = true;
    self.triangles[t.0].v[0] = VIdx(usize::MAX);
    self.free.push(t);
  }

  pub fn find_tri_edge(&self, t: TriIdx, a: VIdx, b: VIdx) -> Option<SubIdx> {
    self.find_tri_edge_by_verts(t, (a, b))
  }

  fn find_tri_edge_by_verts(&self, t: TriIdx, (a, b): (VIdx, VIdx)) -> Option<SubIdx> {
    let tri = &self.triangles[t.0];
    for sub in 0..3 {
      let sub = SubIdx(sub);
      let (x, y) = tri.edge_verts(sub);
      if (x == a && y == b) || (x == b && y == a) {
        return Some(sub);
      }
    }
    None
  }

  fn register_edge(&mut self, t: TriIdx, sub: SubIdx) {
    let (a, b) = self.triangles[t.0].edge_verts(sub);
    let key = edge_key(a, b);
    let entry = self.edge_map.entry(key).or_default();
    entry.push((t, sub));
    if entry.len() == 2 {
      let (t0, s0) = entry[0];
      let (t1, s1) = entry[1];
      self.triangles[t0.0].n[s0.0] = Some(t1);
      self.triangles[t1.0].n[s1.0] = Some(t0);
    }
  }

  fn unregister_edge(&mut self, t: TriIdx, sub: SubIdx) {
    let (a, b) = self.triangles[t.0].edge_verts(sub);
    let key = edge_key(a, b);
    if let Some(entry) = self.edge_map.get_mut(&key) {
      entry.retain(|&(tt, ss)| !(tt == t && ss.0 == sub.0));
      if entry.is_empty() {
        self.edge_map.remove(&key);
      }
    }
  }

  /// Directly patch a neighbor slot. Used by the point inserter, which
  /// reattaches external neighbors to brand-new triangles after a split
  /// and already knows both sides of the link it wants to establish.
  pub fn set_neighbor(&mut self, t: TriIdx, sub: SubIdx, neighbor: Option<TriIdx>) {
    self.triangles[t.0].n[sub.0] = neighbor;
  }

  pub fn edge_owners(&self, a: VIdx, b: VIdx) -> usize {
    self.edge_map.get(&edge_key(a, b)).map(|v| v.len()).unwrap_or(0)
  }

  /// Attempt to flip the edge opposite `V[eL]` in `tL`. Returns the two
  /// new triangle ids on success; `None` if the edge is a boundary edge
  /// or the resulting quadrilateral would not be convex.
  pub fn flip_edge(&mut self, t_l: TriIdx, e_l: SubIdx) -> Option<(TriIdx, TriIdx)> {
    let t_r = self.triangles[t_l.0].n[e_l.0]?;
    let (v1, v2) = self.triangles[t_l.0].edge_verts(e_l);
    let apex = self.triangles[t_l.0].vert(e_l);
    let e_r = self.find_tri_edge(t_r, v1, v2)?;
    let opp = self.triangles[t_r.0].vert(e_r);

    let p_apex = self.vertices[apex.0];
    let p_opp = self.vertices[opp.0];
    let p_v1 = self.vertices[v1.0];
    let p_v2 = self.vertices[v2.0];
    if orient2d(&p_apex, &p_opp, &p_v2) <= 0 || orient2d(&p_opp, &p_apex, &p_v1) <= 0 {
      return None;
    }

    // Capture external neighbors before removal: edges (apex,v1), (v1,opp) from tL/tR
    // and (opp,v2), (v2,apex) from tR/tL, queried via FindTriEdge on the *old* state.
    let ext_apex_v1 = self.external_neighbor(t_l, apex, v1);
    let ext_v2_apex = self.external_neighbor(t_l, v2, apex);
    let ext_v1_opp = self.external_neighbor(t_r, v1, opp);
    let ext_opp_v2 = self.external_neighbor(t_r, opp, v2);

    self.remove_tri(t_l);
    self.remove_tri(t_r);

    let new_left = self.add_tri(apex, opp, v2);
    let new_right = self.add_tri(opp, apex, v1);

    self.reattach(new_left, apex, v1, ext_apex_v1);
    self.reattach(new_left, v2, apex, ext_v2_apex);
    self.reattach(new_right, v1, opp, ext_v1_opp);
    self.reattach(new_right, opp, v2, ext_opp_v2);

    trace!("flip_edge: ({:?},{:?}) -> diagonal ({:?},{:?})", t_l, t_r, apex, opp);
    Some((new_left, new_right))
  }

  fn external_neighbor(&self, owner: TriIdx, a: VIdx, b: VIdx) -> Option<TriIdx> {
    let sub = self.find_tri_edge(owner, a, b)?;
    self.triangles[owner.0].n[sub.0]
  }

  fn reattach(&mut self, new_tri: TriIdx, a: VIdx, b: VIdx, neighbor: Option<TriIdx>) {
    let Some(neighbor) = neighbor else { return };
    if !self.is_live(neighbor) {
      return;
    }
    if let Some(new_sub) = self.find_tri_edge(new_tri, a, b) {
      self.triangles[new_tri.0].n[new_sub.0] = Some(neighbor);
      if let Some(back_sub) = self.find_tri_edge(neighbor, a, b) {
        self.triangles[neighbor.0].n[back_sub.0] = Some(new_tri);
      }
    }
  }

  /// Full invariant check used by tests and by `#[cfg(debug_assertions)]`
  /// internal assertions: CCW winding, adjacency symmetry, edge-use bound.
  pub fn validate(&self) -> Result<(), String> {
    for t in self.live_triangles() {
      let tri = self.tri(t);
      let p = [self.vertex(tri.v[0]), self.vertex(tri.v[1]), self.vertex(tri.v[2])];
      if orient2d(&p[0], &p[1], &p[2]) <= 0 {
        return Err(format!("triangle {:?} is not strictly CCW", t));
      }
      for sub in 0..3 {
        let sub = SubIdx(sub);
        if let Some(neighbor) = tri.n[sub.0] {
          if !self.is_live(neighbor) {
            return Err(format!("triangle {:?} references dead neighbor {:?}", t, neighbor));
          }
          let (a, b) = tri.edge_verts(sub);
          let back = self.find_tri_edge(neighbor, a, b).ok_or_else(|| format!("adjacency asymmetry at {:?}", t))?;
          if self.triangles[neighbor.0].n[back.0] != Some(t) {
            return Err(format!("adjacency asymmetry between {:?} and {:?}", t, neighbor));
          }
        }
      }
    }
    for (key, owners) in &self.edge_map {
      if owners.len() > 2 {
        return Err(format!("edge {:?} has {} owners", key, owners.len()));
      }
    }
    Ok(())
  }
}

#[cfg(debug_assertions)]
pub(crate) fn debug_check_invariant(soup: &TriSoup) {
  if let Err(reason) = soup.validate() {
    panic!("trisoup invariant violated: {reason}");
  }
}

#[cfg(not(debug_assertions))]
pub(crate) fn debug_check_invariant(_soup: &TriSoup) {}

#[cfg(test)]
mod tests {
  use super::*;

  fn square_soup() -> (TriSoup, [VIdx; 4]) {
    let mut soup = TriSoup::new();
    let a = soup.add_vertex(Point::new(0.0, 0.0));
    let b = soup.add_vertex(Point::new(10.0, 0.0));
    let c = soup.add_vertex(Point::new(10.0, 10.0));
    let d = soup.add_vertex(Point::new(0.0, 10.0));
    soup.add_tri(a, b, c);
    soup.add_tri(a, c, d);
    (soup, [a, b, c, d])
  }

  #[test]
  fn two_triangles_share_diagonal_symmetrically() {
    let (soup, _) = square_soup();
    soup.validate().unwrap();
    assert_eq!(soup.edge_owners(VIdx(0), VIdx(2)), 2);
  }

  #[test]
  fn flip_edge_swaps_diagonal() {
    let (mut soup, [a, b, c, d]) = square_soup();
    let t0 = TriIdx(0);
    let sub = soup.find_tri_edge(t0, a, c).unwrap();
    let (l, r) = soup.flip_edge(t0, sub).unwrap();
    soup.validate().unwrap();
    assert_eq!(soup.edge_owners(a, c), 0);
    assert_eq!(soup.edge_owners(b, d), 2);
    assert!(soup.is_live(l) && soup.is_live(r));
  }

  #[test]
  fn flip_edge_rejects_boundary_edge() {
    let (mut soup, [a, b, ..]) = square_soup();
    let t0 = TriIdx(0);
    let sub = soup.find_tri_edge(t0, a, b).unwrap();
    assert!(soup.flip_edge(t0, sub).is_none());
  }

  #[test]
  fn remove_tri_clears_neighbor_back_pointer() {
    let (mut soup, [a, _, c, _]) = square_soup();
    let t0 = TriIdx(0);
    let t1 = TriIdx(1);
    soup.remove_tri(t0);
    assert!(!soup.is_live(t0));
    assert_eq!(soup.edge_owners(a, c), 0);
    let tri1 = soup.tri(t1);
    assert!(tri1.n.iter().all(|n| n.is_none()));
  }
}
