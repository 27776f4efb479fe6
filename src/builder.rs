//! The orchestrator: wires PSLG normalization, cover seeding, ordered
//! vertex insertion, constraint forcing, final legalization, flood-fill
//! classification, and mesh export into the single public entry point.

use std::collections::HashMap;

use log::{debug, info};

use crate::classify::{classify_interior, prune};
use crate::error::BuildError;
use crate::forcer::force_edge;
use crate::insert::{insert_point, Seed};
use crate::legalize::{canonical_edge, legalize, ConstrainedEdges};
use crate::locator::{locate_from, refine_on_vertex, Location};
use crate::mesh::{Mesh, MeshOptions, VertexId};
use crate::point::{Aabb, Point};
use crate::pslg::normalize;
use crate::trisoup::{SubIdx, TriSoup, VIdx};

#[derive(Debug, Clone)]
pub struct BuildOptions {
  pub epsilon: f64,
  pub cover_margin: f64,
  pub random_seed: i64,
  pub use_flood_fill: bool,
  pub mesh_options: MeshOptions,
}

impl Default for BuildOptions {
  fn default() -> BuildOptions {
    BuildOptions { epsilon: 1e-9, cover_margin: 0.5, random_seed: 0, use_flood_fill: true, mesh_options: MeshOptions::default() }
  }
}

/// Build a validated, triangulated [`Mesh`] from an outer boundary,
/// optional holes, and optional extra constraint segments.
pub fn build(outer: &[Point], holes: &[Vec<Point>], extras: &[(Point, Point)], opts: &BuildOptions) -> Result<Mesh, BuildError> {
  let pslg = normalize(outer, holes, extras, opts.epsilon)?;

  let mut soup = TriSoup::new();
  let aabb = Aabb::of_points(&pslg.vertices)
    .ok_or_else(|| BuildError::TopologyFailure { reason: "PSLG produced no vertices".to_string() })?;
  let margin = aabb.span().max(1.0) * opts.cover_margin;
  let cover_box = aabb.inflate(margin);
  let c0 = soup.add_vertex(Point::new(cover_box.min.x, cover_box.min.y));
  let c1 = soup.add_vertex(Point::new(cover_box.max.x, cover_box.min.y));
  let c2 = soup.add_vertex(Point::new(cover_box.max.x, cover_box.max.y));
  let c3 = soup.add_vertex(Point::new(cover_box.min.x, cover_box.max.y));
  soup.add_tri(c0, c1, c2);
  soup.add_tri(c0, c2, c3);
  let cover = [c0, c1, c2, c3];
  debug!("builder: cover box seeded, margin {margin:.6}");

  let mut constrained = ConstrainedEdges::new();
  let order = insertion_order(&pslg_outer_holes(&pslg), pslg.vertices.len());
  let mut vidx: Vec<Option<VIdx>> = vec![None; pslg.vertices.len()];

  for &i in &order {
    let p = pslg.vertices[i];
    let start = soup.live_triangles().next().expect("cover triangles are always live");
    let loc = refine_on_vertex(&soup, locate_from(&soup, start, &p)?, &p, opts.epsilon);
    let v = match loc {
      Location::OnVertex(t, sub) => soup.tri(t).vert(sub),
      other => {
        let v = soup.add_vertex(p);
        let seeds = insert_point(&mut soup, other, v);
        legalize(&mut soup, seeds, &constrained);
        v
      }
    };
    vidx[i] = Some(v);
  }
  let vidx: Vec<VIdx> = vidx.into_iter().map(|v| v.expect("every PSLG vertex is visited by insertion_order")).collect();

  for &(i, j) in &pslg.segments {
    let (a, b) = (vidx[i], vidx[j]);
    if constrained.contains(&canonical_edge(a, b)) {
      continue;
    }
    force_edge(&mut soup, a, b, &mut constrained)?;
  }

  let mut final_seeds = Vec::new();
  for t in soup.live_triangles() {
    for s in 0..3 {
      final_seeds.push(Seed { tri: t, sub: SubIdx(s) });
    }
  }
  legalize(&mut soup, final_seeds, &constrained);

  if opts.use_flood_fill {
    let interior = classify_interior(&soup, &constrained, outer, holes).ok_or(BuildError::NoInteriorSeed)?;
    prune(&mut soup, &interior, &cover);
  } else {
    let all: std::collections::HashSet<_> = soup.live_triangles().collect();
    prune(&mut soup, &all, &cover);
  }

  soup.validate().map_err(|reason| BuildError::TopologyFailure { reason })?;

  let mut mesh = Mesh::new(opts.mesh_options);
  let mut exported: HashMap<VIdx, VertexId> = HashMap::new();
  for t in soup.live_triangles() {
    let tri = soup.tri(t).clone();
    let mut ids = [VertexId(0); 3];
    for k in 0..3 {
      let v = tri.v[k];
      let id = *exported.entry(v).or_insert_with(|| mesh.add_vertex(soup.vertex(v)));
      ids[k] = id;
    }
    mesh.add_triangle(ids[0], ids[1], ids[2])?;
  }

  info!("builder: exported {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
  Ok(mesh)
}

fn pslg_outer_holes(pslg: &crate::pslg::Pslg) -> Vec<&[usize]> {
  let mut loops: Vec<&[usize]> = vec![&pslg.outer];
  loops.extend(pslg.holes.iter().map(|h| h.as_slice()));
  loops
}

/// Outer loop vertices first, then each hole in declaration order, then
/// any remaining vertex (referenced only by an extra segment).
fn insertion_order(loops: &[&[usize]], total: usize) -> Vec<usize> {
  let mut seen = vec![false; total];
  let mut order = Vec::with_capacity(total);
  for loop_ in loops {
    for &i in *loop_ {
      if !seen[i] {
        seen[i] = true;
        order.push(i);
      }
    }
  }
  for i in 0..total {
    if !seen[i] {
      seen[i] = true;
      order.push(i);
    }
  }
  order
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builds_square_with_no_constraints() {
    let outer = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
    let mesh = build(&outer, &[], &[], &BuildOptions::default()).unwrap();
    assert!(mesh.triangle_count() >= 2);
    assert_eq!(mesh.vertex_count(), 4);
  }

  #[test]
  fn builds_square_with_a_hole() {
    let outer = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
    let hole = vec![Point::new(4.0, 4.0), Point::new(6.0, 4.0), Point::new(6.0, 6.0), Point::new(4.0, 6.0)];
    let mesh = build(&outer, &[hole], &[], &BuildOptions::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 8);
    assert!(mesh.triangle_count() >= 8);
  }

  #[test]
  fn builds_with_an_interior_constraint_segment() {
    let outer = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
    let extras = vec![(Point::new(1.0, 1.0), Point::new(9.0, 9.0))];
    let mesh = build(&outer, &[], &extras, &BuildOptions::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 6);
  }
}
