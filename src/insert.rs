//! Point insertion: split a containing triangle (3-way), a shared
//! interior edge (4-way), or a boundary edge (2-way), returning the
//! "outer" edges as legalization seeds. Grounded on the teacher's
//! `TriangularNetwork::insert` three-case split.

use crate::locator::Location;
use crate::trisoup::{SubIdx, TriIdx, TriSoup, VIdx};

/// A triangle + local edge pair to feed the legalizer's FIFO queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
  pub tri: TriIdx,
  pub sub: SubIdx,
}

pub fn insert_point(soup: &mut TriSoup, loc: Location, v: VIdx) -> Vec<Seed> {
  match loc {
    Location::OnVertex(_, _) => Vec::new(),
    Location::InTriangle(t) => insert_in_triangle(soup, t, v),
    Location::OnEdge(t, sub) => insert_on_edge(soup, t, sub, v),
  }
}

fn insert_in_triangle(soup: &mut TriSoup, t: TriIdx, v: VIdx) -> Vec<Seed> {
  let tri = soup.tri(t).clone();
  let [v0, v1, v2] = tri.v;
  let n = tri.n;
  soup.remove_tri(t);

  let t0 = soup.add_tri(v0, v1, v);
  let t1 = soup.add_tri(v1, v2, v);
  let t2 = soup.add_tri(v2, v0, v);

  attach_external(soup, t0, v0, v1, n[2]);
  attach_external(soup, t1, v1, v2, n[0]);
  attach_external(soup, t2, v2, v0, n[1]);

  seeds_opposite(soup, &[t0, t1, t2], v)
}

fn insert_on_edge(soup: &mut TriSoup, t: TriIdx, sub: SubIdx, v: VIdx) -> Vec<Seed> {
  let tri = soup.tri(t).clone();
  let (e1, e2) = tri.edge_verts(sub);
  let apex = tri.vert(sub);
  let ext_apex_e1 = tri.n[sub.cw().0];
  let ext_apex_e2 = tri.n[sub.ccw().0];

  let Some(other) = tri.n[sub.0] else {
    soup.remove_tri(t);
    let t0 = soup.add_tri(apex, e1, v);
    let t1 = soup.add_tri(apex, v, e2);
    attach_external(soup, t0, apex, e1, ext_apex_e1);
    attach_external(soup, t1, apex, e2, ext_apex_e2);
    return seeds_opposite(soup, &[t0, t1], v);
  };

  let other_sub = soup.find_tri_edge(other, e1, e2).expect("neighbor must share the edge");
  let other_tri = soup.tri(other).clone();
  let opp = other_tri.vert(other_sub);
  let ext_opp_e1 = other_tri.n[other_sub.ccw().0];
  let ext_opp_e2 = other_tri.n[other_sub.cw().0];

  soup.remove_tri(t);
  soup.remove_tri(other);

  let t0 = soup.add_tri(apex, e1, v);
  let t1 = soup.add_tri(apex, v, e2);
  let t2 = soup.add_tri(opp, e2, v);
  let t3 = soup.add_tri(opp, v, e1);

  attach_external(soup, t0, apex, e1, ext_apex_e1);
  attach_external(soup, t1, apex, e2, ext_apex_e2);
  attach_external(soup, t2, opp, e2, ext_opp_e1);
  attach_external(soup, t3, opp, e1, ext_opp_e2);

  seeds_opposite(soup, &[t0, t1, t2, t3], v)
}

fn attach_external(soup: &mut TriSoup, new_tri: TriIdx, a: VIdx, b: VIdx, neighbor: Option<TriIdx>) {
  let Some(neighbor) = neighbor else { return };
  if !soup.is_live(neighbor) {
    return;
  }
  if let (Some(new_sub), Some(old_sub)) = (soup.find_tri_edge(new_tri, a, b), soup.find_tri_edge(neighbor, a, b)) {
    soup.set_neighbor(new_tri, new_sub, Some(neighbor));
    soup.set_neighbor(neighbor, old_sub, Some(new_tri));
  }
}

fn seeds_opposite(soup: &TriSoup, tris: &[TriIdx], v: VIdx) -> Vec<Seed> {
  let mut seeds = Vec::with_capacity(tris.len());
  for &t in tris {
    let tri = soup.tri(t);
    if let Some(sub) = (0..3).map(SubIdx).find(|&s| tri.vert(s) == v) {
      seeds.push(Seed { tri: t, sub });
    }
  }
  seeds
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::locator::locate_from;
  use crate::point::Point;

  fn square_soup() -> TriSoup {
    let mut soup = TriSoup::new();
    let a = soup.add_vertex(Point::new(0.0, 0.0));
    let b = soup.add_vertex(Point::new(10.0, 0.0));
    let c = soup.add_vertex(Point::new(10.0, 10.0));
    let d = soup.add_vertex(Point::new(0.0, 10.0));
    soup.add_tri(a, b, c);
    soup.add_tri(a, c, d);
    soup
  }

  #[test]
  fn insert_inside_triangle_yields_three_seeds() {
    let mut soup = square_soup();
    let v = soup.add_vertex(Point::new(5.0, 2.0));
    let loc = locate_from(&soup, TriIdx(0), &soup.vertex(v)).unwrap();
    let seeds = insert_point(&mut soup, loc, v);
    assert_eq!(seeds.len(), 3);
    soup.validate().unwrap();
    assert_eq!(soup.live_triangles().count(), 4);
  }

  #[test]
  fn insert_on_interior_edge_yields_four_seeds() {
    let mut soup = square_soup();
    let v = soup.add_vertex(Point::new(5.0, 5.0));
    let loc = locate_from(&soup, TriIdx(0), &soup.vertex(v)).unwrap();
    assert!(matches!(loc, Location::OnEdge(_, _)));
    let seeds = insert_point(&mut soup, loc, v);
    assert_eq!(seeds.len(), 4);
    soup.validate().unwrap();
    assert_eq!(soup.live_triangles().count(), 4);
  }

  #[test]
  fn insert_on_boundary_edge_yields_two_seeds() {
    let mut soup = square_soup();
    let v = soup.add_vertex(Point::new(5.0, 0.0));
    let loc = locate_from(&soup, TriIdx(0), &soup.vertex(v)).unwrap();
    let seeds = insert_point(&mut soup, loc, v);
    assert_eq!(seeds.len(), 2);
    soup.validate().unwrap();
    assert_eq!(soup.live_triangles().count(), 3);
  }
}
