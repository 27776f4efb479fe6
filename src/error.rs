//! Error taxonomy for every fallible operation in the crate.
//!
//! Each layer (PSLG normalization, the workspace forcer/locator, the mesh)
//! owns a small enum of its own failure modes; [`BuildError`] composes all
//! of them via `#[from]` so the orchestrator can bubble up any lower-layer
//! failure with a single `?`.

use thiserror::Error;

use crate::mesh::VertexId;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PslgError {
  #[error("loop has fewer than 3 vertices")]
  TooFewVertices,
  #[error("coordinate is not finite")]
  NonFiniteCoordinate,
  #[error("outer loop cannot be oriented (degenerate after merge)")]
  NotOrientable,
  #[error("hole is not strictly inside the outer polygon")]
  HoleNotInsideOuter,
  #[error("loop self-intersects")]
  LoopSelfIntersection,
  #[error("two loops intersect without sharing a vertex")]
  LoopIntersectsLoop,
  #[error("loop collapsed to fewer than 3 distinct vertices under epsilon-merge")]
  DegenerateMergedLoop,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MeshError {
  #[error("vertex id {0:?} is out of range")]
  InvalidVertexId(VertexId),
  #[error("triangle is degenerate (|signed area| <= epsilon)")]
  DegenerateTriangle,
  #[error("triangle with the same vertex set already exists")]
  DuplicateTriangle,
  #[error("triangle with the same vertex set but opposite winding already exists")]
  OpposingWindingDuplicate,
  #[error("a non-corner vertex lies strictly inside the new triangle")]
  VertexInsideTriangle,
  #[error("new edge properly intersects an existing edge")]
  EdgeIntersection,
  #[error("new edge properly intersects a perimeter or hole boundary")]
  EdgeCrossesPerimeter,
  #[error("new triangle's intersection area with an existing triangle exceeds epsilon")]
  TriangleOverlap,
  #[error("loop self-intersects")]
  SelfIntersectingLoop,
  #[error("perimeter edge properly intersects an existing perimeter edge")]
  PerimeterIntersectsPerimeter,
  #[error("hole is not contained in exactly one perimeter")]
  HoleOutsidePerimeter,
  #[error("hole vertex lies inside an existing hole, or vice versa")]
  HoleOverlapsHole,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LocateError {
  #[error("query point lies outside the current triangulation")]
  OutsideTriangulation,
  #[error("point location walk returned to an already-visited triangle (circular walk)")]
  CircularWalk,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ForceError {
  #[error("constraint edge crosses an already-constrained edge")]
  CrossesConstraint,
  #[error("constraint forcer exceeded its flip budget")]
  FlipBudgetExceeded,
  #[error("constraint forcer ran out of candidate flips without producing the edge")]
  EdgeNotProduced,
  #[error(transparent)]
  Locate(#[from] LocateError),
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum BuildError {
  #[error(transparent)]
  Pslg(#[from] PslgError),
  #[error(transparent)]
  Mesh(#[from] MeshError),
  #[error(transparent)]
  Force(#[from] ForceError),
  #[error(transparent)]
  Locate(#[from] LocateError),
  #[error("topology validation failed: {reason}")]
  TopologyFailure { reason: String },
  #[error("classifier could not find an interior seed triangle")]
  NoInteriorSeed,
}
