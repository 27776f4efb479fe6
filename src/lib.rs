//! Constrained Delaunay triangulation engine and validated mesh.
//!
//! The pipeline is: normalize a planar straight-line graph ([`pslg`]),
//! seed a bounding cover and incrementally insert vertices into a
//! [`trisoup::TriSoup`] workspace ([`locator`], [`insert`]), legalize
//! with Lawson flips ([`legalize`]), force constraint edges into the
//! triangulation ([`forcer`]), classify and prune to the interior
//! ([`classify`]), and export into a validated [`mesh::Mesh`]. The
//! [`builder`] module wires all of this together as a single call.

pub mod builder;
pub mod classify;
pub mod error;
pub mod forcer;
pub mod insert;
pub mod legalize;
pub mod locator;
pub mod mesh;
pub mod persistence;
pub mod point;
pub mod polygon;
pub mod predicates;
pub mod pslg;
pub mod spatial;
pub mod trisoup;

pub use builder::{build, BuildOptions};
pub use error::BuildError;
pub use mesh::{Mesh, MeshOptions, VertexId};
pub use point::Point;
