//! Interior/exterior classification by flood-fill across non-constrained
//! edges, and the subsequent pruning of exterior and cover triangles.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::legalize::{canonical_edge, ConstrainedEdges};
use crate::point::Point;
use crate::predicates::point_in_polygon;
use crate::trisoup::{SubIdx, TriIdx, TriSoup, VIdx};

pub fn classify_interior(
  soup: &TriSoup,
  constrained: &ConstrainedEdges,
  outer: &[Point],
  holes: &[Vec<Point>],
) -> Option<HashSet<TriIdx>> {
  let seed = find_interior_seed(soup, outer, holes)?;
  let mut interior = HashSet::new();
  let mut queue = VecDeque::new();
  queue.push_back(seed);
  interior.insert(seed);

  while let Some(t) = queue.pop_front() {
    let tri = soup.tri(t);
    for i in 0..3 {
      let sub = SubIdx(i);
      let Some(neighbor) = tri.n[sub.0] else { continue };
      if interior.contains(&neighbor) {
        continue;
      }
      let (a, b) = tri.edge_verts(sub);
      if constrained.contains(&canonical_edge(a, b)) {
        continue;
      }
      interior.insert(neighbor);
      queue.push_back(neighbor);
    }
  }

  debug!("classify_interior: {} of {} live triangles are interior", interior.len(), soup.live_triangles().count());
  Some(interior)
}

fn find_interior_seed(soup: &TriSoup, outer: &[Point], holes: &[Vec<Point>]) -> Option<TriIdx> {
  for t in soup.live_triangles() {
    let tri = soup.tri(t);
    let p0 = soup.vertex(tri.v[0]);
    let p1 = soup.vertex(tri.v[1]);
    let p2 = soup.vertex(tri.v[2]);
    let centroid = Point::new((p0.x + p1.x + p2.x) / 3.0, (p0.y + p1.y + p2.y) / 3.0);
    if !point_in_polygon(&centroid, outer, 0.0) {
      continue;
    }
    if holes.iter().any(|h| point_in_polygon(&centroid, h, 0.0)) {
      continue;
    }
    return Some(t);
  }
  None
}

/// Remove every triangle not in `interior`, then separately remove any
/// triangle still referencing a cover vertex.
pub fn prune(soup: &mut TriSoup, interior: &HashSet<TriIdx>, cover_vertices: &[VIdx; 4]) {
  let exterior: Vec<TriIdx> = soup.live_triangles().filter(|t| !interior.contains(t)).collect();
  for t in exterior {
    soup.remove_tri(t);
  }
  let cover_tris: Vec<TriIdx> =
    soup.live_triangles().filter(|&t| soup.tri(t).v.iter().any(|v| cover_vertices.contains(v))).collect();
  for t in cover_tris {
    soup.remove_tri(t);
  }
}
