//! Lawson legalization: FIFO-queue-driven edge flipping that restores
//! the Delaunay property after an insertion, skipping constrained edges.
//! Grounded on the teacher's `maybe_swap`.

use std::collections::{HashSet, VecDeque};

use log::trace;

use crate::insert::Seed;
use crate::predicates::incircle;
use crate::trisoup::{SubIdx, TriIdx, TriSoup, VIdx};

pub type ConstrainedEdges = HashSet<(VIdx, VIdx)>;

pub fn canonical_edge(a: VIdx, b: VIdx) -> (VIdx, VIdx) {
  if a.0 < b.0 {
    (a, b)
  } else {
    (b, a)
  }
}

/// Drain the seed queue, flipping any illegal edge and re-enqueueing the
/// four outer edges of the resulting pair (the new diagonal is skipped).
pub fn legalize(soup: &mut TriSoup, seeds: Vec<Seed>, constrained: &ConstrainedEdges) {
  let mut queue: VecDeque<Seed> = seeds.into_iter().collect();
  let mut flips = 0usize;
  let budget = (soup.vertex_count() * soup.vertex_count()).max(64);

  while let Some(Seed { tri: t, sub: e }) = queue.pop_front() {
    if !soup.is_live(t) {
      continue;
    }
    let (v1, v2) = soup.tri(t).edge_verts(e);
    if constrained.contains(&canonical_edge(v1, v2)) {
      continue;
    }
    let Some(neighbor) = soup.tri(t).n[e.0] else { continue };
    let apex = soup.tri(t).vert(e);
    let Some(opp_sub) = soup.find_tri_edge(neighbor, v1, v2) else { continue };
    let opposite = soup.tri(neighbor).vert(opp_sub);

    let illegal = incircle(&soup.vertex(apex), &soup.vertex(v1), &soup.vertex(v2), &soup.vertex(opposite)) > 0;
    if !illegal {
      continue;
    }

    if flips >= budget {
      trace!("legalize: flip budget {budget} exhausted, stopping early");
      break;
    }
    if let Some((left, right)) = soup.flip_edge(t, e) {
      flips += 1;
      enqueue_outer_edges(soup, left, &mut queue);
      enqueue_outer_edges(soup, right, &mut queue);
    }
  }
}

fn enqueue_outer_edges(soup: &TriSoup, t: TriIdx, queue: &mut VecDeque<Seed>) {
  for i in 0..3 {
    let sub = SubIdx(i);
    queue.push_back(Seed { tri: t, sub });
  }
}
