//! Robust geometric predicates: orientation, in-circle, segment
//! intersection, point-on-segment and triangle clipping.
//!
//! Every predicate runs a cheap floating-point filter first and only
//! falls through to the adaptive-precision routines in
//! [`geometry_predicates`] when the filter cannot certify a sign. This
//! mirrors the teacher's `Orientation::new`/`Extended::cmp_slope` split
//! between a fast path and an exact fallback, concretized here to `f64`
//! with `geometry-predicates` standing in for the teacher's generic
//! big-rational escape hatch.

use crate::point::Point;

const EPS_FILTER: f64 = 1e-15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
  CounterClockWise,
  ClockWise,
  CoLinear,
}

impl Orientation {
  pub fn from_sign(sign: i32) -> Orientation {
    match sign {
      s if s > 0 => Orientation::CounterClockWise,
      s if s < 0 => Orientation::ClockWise,
      _ => Orientation::CoLinear,
    }
  }

  pub fn reverse(self) -> Orientation {
    match self {
      Orientation::CounterClockWise => Orientation::ClockWise,
      Orientation::ClockWise => Orientation::CounterClockWise,
      Orientation::CoLinear => Orientation::CoLinear,
    }
  }

  pub fn is_ccw(self) -> bool {
    self == Orientation::CounterClockWise
  }
  pub fn is_cw(self) -> bool {
    self == Orientation::ClockWise
  }
  pub fn is_colinear(self) -> bool {
    self == Orientation::CoLinear
  }
}

/// Sign of `det [b-a; c-a]`: +1 CCW, -1 CW, 0 collinear.
pub fn orient2d(a: &Point, b: &Point, c: &Point) -> i32 {
  let det = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
  let bound = max6(a.x.abs(), a.y.abs(), b.x.abs(), b.y.abs(), c.x.abs(), c.y.abs());
  let filter = (bound * bound * EPS_FILTER).max(EPS_FILTER);
  if det > filter {
    1
  } else if det < -filter {
    -1
  } else {
    let exact = geometry_predicates::orient2d([a.x, a.y], [b.x, b.y], [c.x, c.y]);
    signum(exact)
  }
}

pub fn orientation(a: &Point, b: &Point, c: &Point) -> Orientation {
  Orientation::from_sign(orient2d(a, b, c))
}

/// +1 if `d` is strictly inside the circumcircle of CCW-ordered `(a,b,c)`.
pub fn incircle(a: &Point, b: &Point, c: &Point, d: &Point) -> i32 {
  let bound = max6(a.x.abs(), a.y.abs(), b.x.abs(), b.y.abs(), c.x.abs(), c.y.abs()).max(d.x.abs()).max(d.y.abs());
  let filter = (bound * bound * bound * EPS_FILTER).max(EPS_FILTER);
  let det = incircle_det(a, b, c, d);
  if det > filter {
    1
  } else if det < -filter {
    -1
  } else {
    let exact = geometry_predicates::incircle([a.x, a.y], [b.x, b.y], [c.x, c.y], [d.x, d.y]);
    signum(exact)
  }
}

fn incircle_det(a: &Point, b: &Point, c: &Point, d: &Point) -> f64 {
  let (ax, ay) = (a.x - d.x, a.y - d.y);
  let (bx, by) = (b.x - d.x, b.y - d.y);
  let (cx, cy) = (c.x - d.x, c.y - d.y);
  let a2 = ax * ax + ay * ay;
  let b2 = bx * bx + by * by;
  let c2 = cx * cx + cy * cy;
  ax * (by * c2 - b2 * cy) - ay * (bx * c2 - b2 * cx) + a2 * (bx * cy - by * cx)
}

pub fn point_on_segment(p: &Point, a: &Point, b: &Point, eps: f64) -> bool {
  if orient2d(a, b, p) != 0 {
    return false;
  }
  let min_x = a.x.min(b.x) - eps;
  let max_x = a.x.max(b.x) + eps;
  let min_y = a.y.min(b.y) - eps;
  let max_y = a.y.max(b.y) + eps;
  p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y
}

/// Result of [`segment_intersect`]. `t`/`u` are the parametric positions
/// along `(p,q)` and `(r,s)` respectively; `NaN` marks "not applicable"
/// (collinear overlap or no intersection).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentIntersection {
  pub hits: bool,
  pub t: f64,
  pub u: f64,
}

const NO_HIT: SegmentIntersection = SegmentIntersection { hits: false, t: f64::NAN, u: f64::NAN };

pub fn segment_intersect(p: &Point, q: &Point, r: &Point, s: &Point) -> SegmentIntersection {
  let o1 = orient2d(p, q, r);
  let o2 = orient2d(p, q, s);
  let o3 = orient2d(r, s, p);
  let o4 = orient2d(r, s, q);

  if o1 * o2 < 0 && o3 * o4 < 0 {
    return proper_crossing(p, q, r, s);
  }

  if o1 == 0 && o2 == 0 && o3 == 0 && o4 == 0 {
    return collinear_overlap(p, q, r, s);
  }

  // Exactly one endpoint touching the other segment.
  if o1 == 0 && point_on_segment(r, p, q, 0.0) {
    return SegmentIntersection { hits: true, t: param_along(p, q, r), u: 0.0 };
  }
  if o2 == 0 && point_on_segment(s, p, q, 0.0) {
    return SegmentIntersection { hits: true, t: param_along(p, q, s), u: 1.0 };
  }
  if o3 == 0 && point_on_segment(p, r, s, 0.0) {
    return SegmentIntersection { hits: true, t: 0.0, u: param_along(r, s, p) };
  }
  if o4 == 0 && point_on_segment(q, r, s, 0.0) {
    return SegmentIntersection { hits: true, t: 1.0, u: param_along(r, s, q) };
  }

  NO_HIT
}

fn proper_crossing(p: &Point, q: &Point, r: &Point, s: &Point) -> SegmentIntersection {
  let d1x = q.x - p.x;
  let d1y = q.y - p.y;
  let d2x = s.x - r.x;
  let d2y = s.y - r.y;
  let denom = d1x * d2y - d1y * d2x;
  if denom.abs() < 1e-300 {
    // Numerically singular float solve: fall back to an exact rational solve.
    return proper_crossing_exact(p, q, r, s);
  }
  let rpx = r.x - p.x;
  let rpy = r.y - p.y;
  let t = (rpx * d2y - rpy * d2x) / denom;
  let u = (rpx * d1y - rpy * d1x) / denom;
  SegmentIntersection { hits: true, t, u }
}

fn proper_crossing_exact(p: &Point, q: &Point, r: &Point, s: &Point) -> SegmentIntersection {
  use num_bigint::BigInt;
  use num_rational::BigRational;
  let f = |v: f64| BigRational::from_float(v).unwrap_or_else(|| BigRational::from_integer(BigInt::from(0)));
  let (px, py, qx, qy) = (f(p.x), f(p.y), f(q.x), f(q.y));
  let (rx, ry, sx, sy) = (f(r.x), f(r.y), f(s.x), f(s.y));
  let d1x = &qx - &px;
  let d1y = &qy - &py;
  let d2x = &sx - &rx;
  let d2y = &sy - &ry;
  let denom = &d1x * &d2y - &d1y * &d2x;
  if denom == BigRational::from_integer(BigInt::from(0)) {
    return NO_HIT;
  }
  let rpx = &rx - &px;
  let rpy = &ry - &py;
  let t = (&rpx * &d2y - &rpy * &d2x) / &denom;
  let u = (&rpx * &d1y - &rpy * &d1x) / &denom;
  let to_f64 = |r: BigRational| -> f64 {
    r.numer().to_string().parse::<f64>().unwrap_or(f64::NAN)
      / r.denom().to_string().parse::<f64>().unwrap_or(1.0)
  };
  SegmentIntersection { hits: true, t: to_f64(t), u: to_f64(u) }
}

fn collinear_overlap(p: &Point, q: &Point, r: &Point, s: &Point) -> SegmentIntersection {
  // Project onto the dominant axis of p->q and test for interval overlap.
  let (axis_p, axis_q, axis_r, axis_s, other_p, other_q) = if (q.x - p.x).abs() >= (q.y - p.y).abs() {
    (p.x, q.x, r.x, s.x, p.y, q.y)
  } else {
    (p.y, q.y, r.y, s.y, p.x, q.x)
  };
  let _ = (other_p, other_q);
  let (lo1, hi1) = (axis_p.min(axis_q), axis_p.max(axis_q));
  let (lo2, hi2) = (axis_r.min(axis_s), axis_r.max(axis_s));
  let overlap = lo1.max(lo2)..=hi1.min(hi2);
  if overlap.start() <= overlap.end() && (overlap.end() - overlap.start()) > 1e-12 {
    SegmentIntersection { hits: true, t: f64::NAN, u: f64::NAN }
  } else {
    NO_HIT
  }
}

fn param_along(a: &Point, b: &Point, p: &Point) -> f64 {
  let (dx, dy) = b.sub(a);
  let len2 = dx * dx + dy * dy;
  if len2 == 0.0 {
    return 0.0;
  }
  let (px, py) = p.sub(a);
  (px * dx + py * dy) / len2
}

pub fn point_in_triangle(p: &Point, a: &Point, b: &Point, c: &Point) -> bool {
  let ab = orient2d(a, b, p);
  let bc = orient2d(b, c, p);
  let ca = orient2d(c, a, p);
  !(ab < 0 || bc < 0 || ca < 0) || !(ab > 0 || bc > 0 || ca > 0)
}

pub fn point_strictly_in_triangle(p: &Point, a: &Point, b: &Point, c: &Point) -> bool {
  let ab = orient2d(a, b, p);
  let bc = orient2d(b, c, p);
  let ca = orient2d(c, a, p);
  (ab > 0 && bc > 0 && ca > 0) || (ab < 0 && bc < 0 && ca < 0)
}

/// Sutherland-Hodgman clip of polygon `subject` by the CCW triangle
/// `clip`. Both inputs are reoriented to CCW first so the result is
/// independent of caller winding.
pub fn triangle_intersection_polygon(a_tri: [Point; 3], b_tri: [Point; 3]) -> Vec<Point> {
  let a = ensure_ccw(a_tri);
  let b = ensure_ccw(b_tri);
  let mut output: Vec<Point> = a.to_vec();
  for i in 0..3 {
    if output.is_empty() {
      break;
    }
    let edge_a = b[i];
    let edge_b = b[(i + 1) % 3];
    let input = std::mem::take(&mut output);
    let len = input.len();
    for j in 0..len {
      let cur = input[j];
      let prev = input[(j + len - 1) % len];
      let cur_inside = orient2d(&edge_a, &edge_b, &cur) >= 0;
      let prev_inside = orient2d(&edge_a, &edge_b, &prev) >= 0;
      if cur_inside {
        if !prev_inside {
          if let Some(hit) = line_intersection(prev, cur, edge_a, edge_b) {
            output.push(hit);
          }
        }
        output.push(cur);
      } else if prev_inside {
        if let Some(hit) = line_intersection(prev, cur, edge_a, edge_b) {
          output.push(hit);
        }
      }
    }
  }
  output
}

pub fn triangle_intersection_area(a_tri: [Point; 3], b_tri: [Point; 3]) -> f64 {
  let poly = triangle_intersection_polygon(a_tri, b_tri);
  polygon_signed_area(&poly).abs()
}

fn ensure_ccw(tri: [Point; 3]) -> [Point; 3] {
  if orient2d(&tri[0], &tri[1], &tri[2]) < 0 {
    [tri[0], tri[2], tri[1]]
  } else {
    tri
  }
}

fn line_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
  let d1x = p2.x - p1.x;
  let d1y = p2.y - p1.y;
  let d2x = p4.x - p3.x;
  let d2y = p4.y - p3.y;
  let denom = d1x * d2y - d1y * d2x;
  if denom.abs() < 1e-300 {
    return None;
  }
  let t = ((p3.x - p1.x) * d2y - (p3.y - p1.y) * d2x) / denom;
  Some(Point::new(p1.x + t * d1x, p1.y + t * d1y))
}

pub fn polygon_signed_area(points: &[Point]) -> f64 {
  if points.len() < 3 {
    return 0.0;
  }
  let mut sum = 0.0;
  for i in 0..points.len() {
    let a = points[i];
    let b = points[(i + 1) % points.len()];
    sum += a.x * b.y - b.x * a.y;
  }
  sum / 2.0
}

pub fn polygon_self_intersects(points: &[Point]) -> bool {
  let n = points.len();
  if n < 4 {
    return false;
  }
  for i in 0..n {
    let a1 = points[i];
    let a2 = points[(i + 1) % n];
    for j in (i + 1)..n {
      // Skip edges adjacent to edge i (sharing a vertex).
      if j == i || (j + 1) % n == i || j == (i + 1) % n {
        continue;
      }
      let b1 = points[j];
      let b2 = points[(j + 1) % n];
      let hit = segment_intersect(&a1, &a2, &b1, &b2);
      if hit.hits && !(hit.t == 0.0 || hit.t == 1.0) {
        return true;
      }
    }
  }
  false
}

/// Even-odd ray-cast point-in-polygon test plus a boundary preflight.
pub fn point_in_polygon(p: &Point, points: &[Point], eps: f64) -> bool {
  let n = points.len();
  for i in 0..n {
    let a = points[i];
    let b = points[(i + 1) % n];
    if point_on_segment(p, &a, &b, eps) {
      return true;
    }
  }
  let mut inside = false;
  for i in 0..n {
    let a = points[i];
    let b = points[(i + 1) % n];
    let crosses_y = (a.y > p.y) != (b.y > p.y);
    if crosses_y {
      let x_at_y = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
      if p.x < x_at_y {
        inside = !inside;
      }
    }
  }
  inside
}

fn max6(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> f64 {
  a.max(b).max(c).max(d).max(e).max(f)
}

fn signum(v: f64) -> i32 {
  if v > 0.0 {
    1
  } else if v < 0.0 {
    -1
  } else {
    0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn orient2d_basic_cases() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(1.0, 0.0);
    let c = Point::new(0.0, 1.0);
    assert_eq!(orient2d(&a, &b, &c), 1);
    assert_eq!(orient2d(&a, &c, &b), -1);
    assert_eq!(orient2d(&a, &b, &Point::new(2.0, 0.0)), 0);
  }

  #[test]
  fn incircle_classic_unit_circle() {
    let a = Point::new(1.0, 0.0);
    let b = Point::new(0.0, 1.0);
    let c = Point::new(-1.0, 0.0);
    assert_eq!(incircle(&a, &b, &c, &Point::new(0.0, 0.0)), 1);
    assert_eq!(incircle(&a, &b, &c, &Point::new(0.0, -2.0)), -1);
  }

  #[test]
  fn segment_intersect_proper_crossing() {
    let hit = segment_intersect(
      &Point::new(0.0, 0.0),
      &Point::new(2.0, 2.0),
      &Point::new(0.0, 2.0),
      &Point::new(2.0, 0.0),
    );
    assert!(hit.hits);
    assert!((hit.t - 0.5).abs() < 1e-9);
    assert!((hit.u - 0.5).abs() < 1e-9);
  }

  #[test]
  fn segment_intersect_parallel_no_hit() {
    let hit = segment_intersect(
      &Point::new(0.0, 0.0),
      &Point::new(1.0, 0.0),
      &Point::new(0.0, 1.0),
      &Point::new(1.0, 1.0),
    );
    assert!(!hit.hits);
  }

  #[test]
  fn triangle_intersection_area_full_overlap() {
    let tri = [Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 4.0)];
    let area = triangle_intersection_area(tri, tri);
    assert!((area - 8.0).abs() < 1e-9);
  }

  #[test]
  fn polygon_square_is_convex_and_ccw() {
    let square = [
      Point::new(0.0, 0.0),
      Point::new(10.0, 0.0),
      Point::new(10.0, 10.0),
      Point::new(0.0, 10.0),
    ];
    assert!(polygon_signed_area(&square) > 0.0);
    assert!(!polygon_self_intersects(&square));
  }

  #[test]
  fn point_in_polygon_square() {
    let square = [
      Point::new(0.0, 0.0),
      Point::new(10.0, 0.0),
      Point::new(10.0, 10.0),
      Point::new(0.0, 10.0),
    ];
    assert!(point_in_polygon(&Point::new(5.0, 5.0), &square, 1e-9));
    assert!(!point_in_polygon(&Point::new(15.0, 5.0), &square, 1e-9));
  }
}
