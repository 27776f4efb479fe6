use cdt_mesh::builder::{build, BuildOptions};
use cdt_mesh::mesh::{Mesh, MeshOptions, VertexId};
use cdt_mesh::point::Point;
use cdt_mesh::predicates::{incircle, orient2d, point_strictly_in_triangle};

fn triangle_coords(mesh: &Mesh, t: &[VertexId; 3]) -> [Point; 3] {
  [mesh.vertex(t[0]), mesh.vertex(t[1]), mesh.vertex(t[2])]
}

fn contains_coord(mesh: &Mesh, p: Point, eps2: f64) -> bool {
  (0..mesh.vertex_count()).any(|i| mesh.vertex(VertexId(i)).dist2(&p) <= eps2)
}

fn triangles_containing_point(mesh: &Mesh, p: Point) -> usize {
  mesh
    .triangles()
    .iter()
    .filter(|t| {
      let c = triangle_coords(mesh, t);
      point_strictly_in_triangle(&p, &c[0], &c[1], &c[2])
    })
    .count()
}

#[test]
fn s1_square_no_holes() {
  let outer = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
  let mesh = build(&outer, &[], &[], &BuildOptions::default()).unwrap();
  assert!(mesh.triangle_count() >= 2);
  for &(a, b) in &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
    assert!(contains_coord(&mesh, Point::new(a, b), 1e-12));
  }
  for t in mesh.triangles() {
    let c = triangle_coords(&mesh, t);
    assert!(orient2d(&c[0], &c[1], &c[2]) > 0);
  }
}

#[test]
fn s2_square_with_centered_hole() {
  let outer = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
  let hole = vec![Point::new(3.0, 3.0), Point::new(3.0, 7.0), Point::new(7.0, 7.0), Point::new(7.0, 3.0)];
  let mesh = build(&outer, &[hole], &[], &BuildOptions::default()).unwrap();
  assert_eq!(mesh.vertex_count(), 8);
  assert_eq!(triangles_containing_point(&mesh, Point::new(5.0, 5.0)), 0);
  assert_eq!(triangles_containing_point(&mesh, Point::new(1.0, 1.0)), 1);
}

#[test]
fn s3_pentagon_is_delaunay() {
  let outer =
    vec![Point::new(5.0, 0.0), Point::new(10.0, 4.0), Point::new(8.0, 10.0), Point::new(2.0, 10.0), Point::new(0.0, 4.0)];
  let mesh = build(&outer, &[], &[], &BuildOptions::default()).unwrap();
  assert_eq!(mesh.boundary_edges().len(), 5);

  for t in mesh.triangles() {
    let c = triangle_coords(&mesh, t);
    for other in mesh.triangles() {
      if std::ptr::eq(t, other) {
        continue;
      }
      for &ov in other {
        if t.contains(&ov) {
          continue;
        }
        let p = mesh.vertex(ov);
        assert!(incircle(&c[0], &c[1], &c[2], &p) <= 0, "non-Delaunay edge found");
      }
    }
  }
}

#[test]
fn s4_square_with_diagonal_constraint() {
  let outer = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
  let extras = vec![(Point::new(0.0, 0.0), Point::new(10.0, 10.0))];
  let mesh = build(&outer, &[], &extras, &BuildOptions::default()).unwrap();
  let v0 = (0..mesh.vertex_count()).find(|&i| mesh.vertex(VertexId(i)) == Point::new(0.0, 0.0)).unwrap();
  let v2 = (0..mesh.vertex_count()).find(|&i| mesh.vertex(VertexId(i)) == Point::new(10.0, 10.0)).unwrap();
  let has_diagonal = mesh.triangles().iter().any(|t| t.contains(&VertexId(v0)) && t.contains(&VertexId(v2)));
  assert!(has_diagonal);
}

#[test]
fn s5_l_shape_excludes_the_notch() {
  let outer = vec![
    Point::new(0.0, 0.0),
    Point::new(10.0, 0.0),
    Point::new(10.0, 5.0),
    Point::new(5.0, 5.0),
    Point::new(5.0, 10.0),
    Point::new(0.0, 10.0),
  ];
  let mesh = build(&outer, &[], &[], &BuildOptions::default()).unwrap();
  assert_eq!(triangles_containing_point(&mesh, Point::new(7.0, 7.0)), 0);
  assert_eq!(triangles_containing_point(&mesh, Point::new(3.0, 3.0)), 1);
  assert_eq!(triangles_containing_point(&mesh, Point::new(7.0, 2.0)), 1);
}

#[test]
fn s6_opposing_winding_duplicate_rejected() {
  let mut opts = MeshOptions::default();
  opts.error_on_duplicate_triangle = false;
  opts.error_on_opposing_duplicate = true;
  let mut mesh = Mesh::new(opts);
  let a = mesh.add_vertex(Point::new(0.0, 0.0));
  let b = mesh.add_vertex(Point::new(1.0, 0.0));
  let c = mesh.add_vertex(Point::new(0.0, 1.0));
  mesh.add_triangle(a, b, c).unwrap();
  let err = mesh.add_triangle(a, c, b).unwrap_err();
  assert_eq!(err, cdt_mesh::error::MeshError::OpposingWindingDuplicate);
}

#[test]
fn s7_third_triangle_on_same_edge_rejected() {
  let mut opts = MeshOptions::default();
  opts.validate_edge_intersection = true;
  opts.error_on_duplicate_triangle = false;
  opts.error_on_opposing_duplicate = false;
  opts.validate_vertex_inside = false;
  let mut mesh = Mesh::new(opts);
  let a = mesh.add_vertex(Point::new(0.0, 0.0));
  let b = mesh.add_vertex(Point::new(10.0, 0.0));
  let c = mesh.add_vertex(Point::new(5.0, 5.0));
  let d = mesh.add_vertex(Point::new(5.0, -5.0));
  mesh.add_triangle(a, b, c).unwrap();
  mesh.add_triangle(b, a, d).unwrap();
  let err = mesh.add_triangle(a, b, c).unwrap_err();
  assert!(matches!(err, cdt_mesh::error::MeshError::EdgeIntersection | cdt_mesh::error::MeshError::DuplicateTriangle));
}
