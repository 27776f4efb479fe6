//! PSLG normalization: epsilon-merge, winding correction, and validity
//! checks that turn raw point loops into an indexed planar straight-line
//! graph ready for triangulation.

use log::{debug, trace};

use crate::error::PslgError;
use crate::point::Point;
use crate::predicates::{point_in_polygon, polygon_self_intersects, polygon_signed_area, segment_intersect};

/// A normalized planar straight-line graph: deduplicated vertices plus
/// index loops/segments referencing them.
#[derive(Debug, Clone)]
pub struct Pslg {
  pub vertices: Vec<Point>,
  pub outer: Vec<usize>,
  pub holes: Vec<Vec<usize>>,
  pub segments: Vec<(usize, usize)>,
}

/// Merge distance used by the epsilon-merge pass. The source's
/// caller-supplied `MergeDistance(p,q)` collapses, absent a stated
/// scale-dependent alternative, to the constant form: merging tests
/// `Dist²(p,q) <= epsilon²` directly.
fn merge_distance() -> f64 {
  1.0
}

pub fn normalize(
  outer: &[Point],
  holes: &[Vec<Point>],
  extras: &[(Point, Point)],
  epsilon: f64,
) -> Result<Pslg, PslgError> {
  validate_loop_shape(outer)?;
  for hole in holes {
    validate_loop_shape(hole)?;
  }

  let mut all_points: Vec<Point> = Vec::new();
  all_points.extend_from_slice(outer);
  for hole in holes {
    all_points.extend_from_slice(hole);
  }
  for (a, b) in extras {
    all_points.push(*a);
    all_points.push(*b);
  }

  let (merged, remap) = merge_points(&all_points, epsilon);
  trace!("pslg: merged {} raw points into {} distinct vertices", all_points.len(), merged.len());

  let mut cursor = 0;
  let outer_idx = remap_loop(&remap, &mut cursor, outer.len());
  let mut hole_idxs = Vec::with_capacity(holes.len());
  for hole in holes {
    hole_idxs.push(remap_loop(&remap, &mut cursor, hole.len()));
  }
  let mut segments = Vec::with_capacity(extras.len());
  for _ in extras {
    let a = remap[cursor];
    let b = remap[cursor + 1];
    cursor += 2;
    segments.push((a, b));
  }

  let outer_idx = dedupe_consecutive(outer_idx);
  if outer_idx.len() < 3 {
    return Err(PslgError::DegenerateMergedLoop);
  }
  let mut normalized_holes = Vec::with_capacity(hole_idxs.len());
  for h in hole_idxs {
    let h = dedupe_consecutive(h);
    if h.len() < 3 {
      return Err(PslgError::DegenerateMergedLoop);
    }
    normalized_holes.push(h);
  }

  let outer_idx = enforce_winding(outer_idx, &merged, true);
  let normalized_holes: Vec<Vec<usize>> =
    normalized_holes.into_iter().map(|h| enforce_winding(h, &merged, false)).collect();

  validate_pslg(&outer_idx, &normalized_holes, &merged)?;

  segments.extend(loop_segments(&outer_idx));
  for h in &normalized_holes {
    segments.extend(loop_segments(h));
  }

  debug!(
    "pslg normalized: {} vertices, {} holes, {} segments",
    merged.len(),
    normalized_holes.len(),
    segments.len()
  );

  Ok(Pslg { vertices: merged, outer: outer_idx, holes: normalized_holes, segments })
}

fn validate_loop_shape(points: &[Point]) -> Result<(), PslgError> {
  if points.len() < 3 {
    return Err(PslgError::TooFewVertices);
  }
  if points.iter().any(|p| !p.is_finite()) {
    return Err(PslgError::NonFiniteCoordinate);
  }
  Ok(())
}

fn merge_points(points: &[Point], epsilon: f64) -> (Vec<Point>, Vec<usize>) {
  let eps2 = (epsilon * merge_distance()).powi(2);
  let mut merged: Vec<Point> = Vec::new();
  let mut remap = Vec::with_capacity(points.len());
  for p in points {
    let mut found = None;
    for (i, q) in merged.iter().enumerate() {
      if p.dist2(q) <= eps2 {
        found = Some(i);
        break;
      }
    }
    match found {
      Some(i) => remap.push(i),
      None => {
        remap.push(merged.len());
        merged.push(*p);
      }
    }
  }
  (merged, remap)
}

fn remap_loop(remap: &[usize], cursor: &mut usize, len: usize) -> Vec<usize> {
  let slice = remap[*cursor..*cursor + len].to_vec();
  *cursor += len;
  slice
}

fn dedupe_consecutive(loop_idx: Vec<usize>) -> Vec<usize> {
  let mut out: Vec<usize> = Vec::with_capacity(loop_idx.len());
  for v in loop_idx {
    if out.last() != Some(&v) {
      out.push(v);
    }
  }
  if out.len() > 1 && out.first() == out.last() {
    out.pop();
  }
  out
}

fn enforce_winding(loop_idx: Vec<usize>, vertices: &[Point], want_ccw: bool) -> Vec<usize> {
  let pts: Vec<Point> = loop_idx.iter().map(|&i| vertices[i]).collect();
  let area = polygon_signed_area(&pts);
  let is_ccw = area > 0.0;
  if is_ccw == want_ccw {
    loop_idx
  } else {
    loop_idx.into_iter().rev().collect()
  }
}

fn loop_segments(loop_idx: &[usize]) -> Vec<(usize, usize)> {
  let n = loop_idx.len();
  (0..n).map(|i| (loop_idx[i], loop_idx[(i + 1) % n])).collect()
}

fn validate_pslg(outer: &[usize], holes: &[Vec<usize>], vertices: &[Point]) -> Result<(), PslgError> {
  let outer_pts: Vec<Point> = outer.iter().map(|&i| vertices[i]).collect();
  if polygon_self_intersects(&outer_pts) {
    return Err(PslgError::LoopSelfIntersection);
  }
  if polygon_signed_area(&outer_pts) <= 0.0 {
    return Err(PslgError::NotOrientable);
  }

  for hole in holes {
    let hole_pts: Vec<Point> = hole.iter().map(|&i| vertices[i]).collect();
    if polygon_self_intersects(&hole_pts) {
      return Err(PslgError::LoopSelfIntersection);
    }
    if polygon_signed_area(&hole_pts) >= 0.0 {
      return Err(PslgError::NotOrientable);
    }
    if !point_in_polygon(&hole_pts[0], &outer_pts, 0.0) {
      return Err(PslgError::HoleNotInsideOuter);
    }
    if loops_properly_intersect(&outer_pts, &hole_pts) {
      return Err(PslgError::LoopIntersectsLoop);
    }
  }

  for i in 0..holes.len() {
    for j in (i + 1)..holes.len() {
      let a: Vec<Point> = holes[i].iter().map(|&v| vertices[v]).collect();
      let b: Vec<Point> = holes[j].iter().map(|&v| vertices[v]).collect();
      if loops_properly_intersect(&a, &b) {
        return Err(PslgError::LoopIntersectsLoop);
      }
    }
  }

  Ok(())
}

fn loops_properly_intersect(a: &[Point], b: &[Point]) -> bool {
  let an = a.len();
  let bn = b.len();
  for i in 0..an {
    let a1 = a[i];
    let a2 = a[(i + 1) % an];
    for j in 0..bn {
      let b1 = b[j];
      let b2 = b[(j + 1) % bn];
      if a1 == b1 || a1 == b2 || a2 == b1 || a2 == b2 {
        continue;
      }
      let hit = segment_intersect(&a1, &a2, &b1, &b2);
      if hit.hits {
        return true;
      }
    }
  }
  false
}
