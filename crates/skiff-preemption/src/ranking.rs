//! Victim ranking.
//!
//! Candidates are evicted in this order:
//! 1. non-production before production
//! 2. lower priority first
//! 3. larger footprint first
//! 4. task ID, ascending
//!
//! Footprints are compared lexicographically over disk, RAM, ports and CPU.
//! That order agrees with resource dominance wherever dominance decides, and
//! unlike [`ResourceVector::compare`] it is a total order, so sorting is
//! deterministic for incomparable footprints.

use std::cmp::Ordering;

use skiff_resources::ResourceVector;

use crate::candidate::PreemptionCandidate;

/// Orders two candidates by eviction preference; `Less` is evicted first.
#[must_use]
pub fn victim_order(a: &PreemptionCandidate, b: &PreemptionCandidate) -> Ordering {
    a.production
        .cmp(&b.production)
        .then_with(|| a.priority.cmp(&b.priority))
        .then_with(|| footprint_order(&b.resources, &a.resources))
        .then_with(|| a.task_id.cmp(&b.task_id))
}

/// Sorts candidates so the preferred victim comes first.
#[must_use]
pub fn rank_victims(mut candidates: Vec<PreemptionCandidate>) -> Vec<PreemptionCandidate> {
    candidates.sort_by(victim_order);
    candidates
}

fn footprint_order(a: &ResourceVector, b: &ResourceVector) -> Ordering {
    a.disk_bytes()
        .cmp(&b.disk_bytes())
        .then_with(|| a.ram_bytes().cmp(&b.ram_bytes()))
        .then_with(|| a.num_ports().cmp(&b.num_ports()))
        .then_with(|| a.cpus().total_cmp(&b.cpus()))
}
