//! Per-host victim selection.

use std::sync::Arc;

use skiff_executor::ExecutorLookup;
use skiff_resources::ResourceVector;
use tracing::debug;

use crate::candidate::{PendingTask, PreemptionCandidate};
use crate::ranking::rank_victims;

/// Tasks chosen for eviction on one host.
#[derive(Debug, Clone, PartialEq)]
pub struct VictimSet {
    /// Host the victims run on.
    pub host: String,
    /// Victims in eviction order.
    pub victims: Vec<PreemptionCandidate>,
    /// Resources freed by evicting all victims, executor overhead included.
    pub freed: ResourceVector,
}

impl VictimSet {
    fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            victims: Vec::new(),
            freed: ResourceVector::ZERO,
        }
    }

    fn add_victim(&mut self, victim: PreemptionCandidate, charged: ResourceVector) {
        self.freed = self.freed + charged;
        self.victims.push(victim);
    }

    /// Number of victims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.victims.len()
    }

    /// Returns true if there are no victims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.victims.is_empty()
    }

    /// Victim task IDs in eviction order.
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.victims.iter().map(|v| v.task_id.as_str())
    }
}

/// Finds the tasks to evict from a host so a pending task fits.
///
/// This is a single-host check. Choosing which host to preempt on is left to
/// the caller.
pub struct VictimFilter {
    executors: Arc<dyn ExecutorLookup>,
}

impl VictimFilter {
    /// Creates a filter that charges executor overhead from `executors`.
    #[must_use]
    pub fn new(executors: Arc<dyn ExecutorLookup>) -> Self {
        Self { executors }
    }

    /// Returns the resources a task really occupies, executor overhead included.
    ///
    /// Tasks without an executor occupy exactly their footprint. An executor
    /// missing from the registry is charged no overhead.
    #[must_use]
    pub fn charged_resources(&self, executor: Option<&str>, resources: &ResourceVector) -> ResourceVector {
        let Some(name) = executor else {
            return *resources;
        };
        match self.executors.get(name) {
            Ok(profile) => profile.apply_overhead(resources),
            Err(e) => {
                debug!(executor = %name, error = %e, "no overhead for unknown executor");
                *resources
            }
        }
    }

    /// Selects victims on `host` for `pending`.
    ///
    /// Eligible candidates on the host are taken in ranked order until the
    /// host's slack plus the freed resources covers the pending task in every
    /// dimension. Returns `None` if the pending task already fits in the slack
    /// or if evicting every eligible candidate would still not be enough.
    #[must_use]
    pub fn filter(
        &self,
        pending: &PendingTask,
        host: &str,
        host_slack: &ResourceVector,
        candidates: &[PreemptionCandidate],
    ) -> Option<VictimSet> {
        let required = self.charged_resources(pending.executor_name.as_deref(), &pending.resources);
        if host_slack.dominates_or_equal(&required) {
            debug!(host = %host, "pending task fits without preemption");
            return None;
        }

        let eligible: Vec<PreemptionCandidate> = candidates
            .iter()
            .filter(|c| c.host == host && pending.can_preempt(c))
            .cloned()
            .collect();

        let mut victims = VictimSet::new(host);
        for candidate in rank_victims(eligible) {
            let charged = self.charged_resources(candidate.executor_name.as_deref(), &candidate.resources);
            victims.add_victim(candidate, charged);
            if (*host_slack + victims.freed).dominates_or_equal(&required) {
                debug!(host = %host, victims = victims.len(), "found preemption victims");
                return Some(victims);
            }
        }

        debug!(host = %host, "not enough preemptible resources on host");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_executor::{CommandInfo, ExecutorProfile, ExecutorRegistry};

    fn filter() -> VictimFilter {
        let command = CommandInfo::create(&["x".to_string()], &[], "./").expect("command");
        let registry = ExecutorRegistry::new().with_profile(
            ExecutorProfile::new("custom", command)
                .with_overhead(ResourceVector::from_megabytes(0.5, 256, 0, 0)),
        );
        VictimFilter::new(Arc::new(registry))
    }

    fn pending(cpus: f64, ram_mb: u64) -> PendingTask {
        PendingTask {
            role: "role".into(),
            production: true,
            priority: 0,
            resources: ResourceVector::from_megabytes(cpus, ram_mb, 1, 0),
            executor_name: None,
        }
    }

    fn victim(id: &str, host: &str, cpus: f64, ram_mb: u64) -> PreemptionCandidate {
        PreemptionCandidate::new(id, host, "role", ResourceVector::from_megabytes(cpus, ram_mb, 1, 0))
    }

    #[test]
    fn charges_known_executor_overhead() {
        let f = filter();
        let raw = ResourceVector::from_megabytes(1.0, 1024, 10, 0);
        assert_eq!(
            f.charged_resources(Some("custom"), &raw),
            ResourceVector::from_megabytes(1.5, 1280, 10, 0)
        );
        assert_eq!(f.charged_resources(None, &raw), raw);
        assert_eq!(f.charged_resources(Some("missing"), &raw), raw);
    }

    #[test]
    fn no_preemption_when_slack_suffices() {
        let slack = ResourceVector::from_megabytes(4.0, 4096, 100, 0);
        let result = filter().filter(&pending(1.0, 512), "h1", &slack, &[victim("a", "h1", 1.0, 512)]);
        assert!(result.is_none());
    }

    #[test]
    fn takes_largest_victims_until_fit() {
        let candidates = [
            victim("small", "h1", 1.0, 256),
            victim("large", "h1", 2.0, 1024),
            victim("other-host", "h2", 8.0, 8192),
        ];
        let result = filter().filter(&pending(2.0, 1024), "h1", &ResourceVector::ZERO, &candidates);
        let set = result.expect("victims");
        assert_eq!(set.host, "h1");
        assert_eq!(set.task_ids().collect::<Vec<_>>(), ["large"]);
        assert_eq!(set.freed, ResourceVector::from_megabytes(2.0, 1024, 1, 0));
    }

    #[test]
    fn combines_slack_and_multiple_victims() {
        let candidates = [victim("a", "h1", 1.0, 256), victim("b", "h1", 1.0, 256)];
        let slack = ResourceVector::from_megabytes(0.5, 600, 0, 0);
        let set = filter()
            .filter(&pending(2.5, 1024), "h1", &slack, &candidates)
            .expect("victims");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn ineligible_victims_are_skipped() {
        let protected = victim("prod", "h1", 8.0, 8192).with_production(true);
        let result = filter().filter(&pending(1.0, 128), "h1", &ResourceVector::ZERO, &[protected]);
        assert!(result.is_none());
    }

    #[test]
    fn victim_overhead_counts_toward_freed() {
        let with_executor = victim("a", "h1", 1.0, 256).with_executor("custom");
        let set = filter()
            .filter(&pending(1.5, 512), "h1", &ResourceVector::ZERO, &[with_executor])
            .expect("victims");
        assert_eq!(set.freed, ResourceVector::from_megabytes(1.5, 512, 1, 0));
    }

    #[test]
    fn not_enough_on_host() {
        let result = filter().filter(
            &pending(16.0, 128),
            "h1",
            &ResourceVector::ZERO,
            &[victim("a", "h1", 1.0, 256)],
        );
        assert!(result.is_none());
    }
}
