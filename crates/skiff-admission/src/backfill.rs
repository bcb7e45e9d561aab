//! Reconciles legacy scalar resource fields with typed resource claims.

use skiff_model::{Resource, ResourceType, TaskConfig};

/// Brings the two resource representations of a task into agreement.
pub trait Backfill: Send + Sync {
    /// Fills whichever representation is missing from the other.
    fn backfill_task(&self, task: &mut TaskConfig);
}

/// Backfill between `num_cpus`/`ram_mb`/`disk_mb`/`requested_ports` and `resources`.
///
/// Typed claims are authoritative. Every legacy field whose resource type has
/// no claim yet becomes a claim, then every legacy field is overwritten from
/// the claims so both representations agree. Running it twice changes nothing
/// the second time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyResourceBackfill;

impl Backfill for LegacyResourceBackfill {
    fn backfill_task(&self, task: &mut TaskConfig) {
        claims_from_legacy(task);
        legacy_from_claims(task);
    }
}

fn claims_from_legacy(task: &mut TaskConfig) {
    let mut claims = Vec::new();
    if let Some(cpus) = task.num_cpus.filter(|_| !has_claim(task, ResourceType::Cpus)) {
        claims.push(Resource::NumCpus(cpus));
    }
    if let Some(ram) = task.ram_mb.filter(|_| !has_claim(task, ResourceType::RamMb)) {
        claims.push(Resource::RamMb(ram));
    }
    if let Some(disk) = task.disk_mb.filter(|_| !has_claim(task, ResourceType::DiskMb)) {
        claims.push(Resource::DiskMb(disk));
    }
    if let Some(ports) = task
        .requested_ports
        .as_ref()
        .filter(|_| !has_claim(task, ResourceType::Ports))
    {
        claims.extend(ports.iter().cloned().map(Resource::NamedPort));
    }
    task.resources.extend(claims);
}

fn legacy_from_claims(task: &mut TaskConfig) {
    for resource in &task.resources {
        match resource {
            Resource::NumCpus(v) => task.num_cpus = Some(*v),
            Resource::RamMb(v) => task.ram_mb = Some(*v),
            Resource::DiskMb(v) => task.disk_mb = Some(*v),
            _ => {}
        }
    }
    task.requested_ports = Some(task.named_ports().map(str::to_string).collect());
}

fn has_claim(task: &TaskConfig, resource_type: ResourceType) -> bool {
    task.resources_of(resource_type).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_model::JobKey;
    use std::collections::BTreeSet;

    fn legacy_task() -> TaskConfig {
        let mut task = TaskConfig::new(JobKey::new("role", "dev", "job"));
        task.num_cpus = Some(1.0);
        task.ram_mb = Some(1024);
        task.disk_mb = Some(512);
        task.requested_ports = Some(BTreeSet::from(["http".to_string()]));
        task
    }

    #[test]
    fn builds_claims_from_legacy_fields() {
        let mut task = legacy_task();
        LegacyResourceBackfill.backfill_task(&mut task);
        assert_eq!(
            task.resources,
            vec![
                Resource::NumCpus(1.0),
                Resource::RamMb(1024),
                Resource::DiskMb(512),
                Resource::NamedPort("http".into()),
            ]
        );
    }

    #[test]
    fn fills_legacy_fields_from_claims() {
        let mut task = TaskConfig::new(JobKey::new("role", "dev", "job"))
            .with_resource(Resource::NumCpus(2.0))
            .with_resource(Resource::RamMb(64))
            .with_resource(Resource::DiskMb(32))
            .with_resource(Resource::NamedPort("health".into()));
        LegacyResourceBackfill.backfill_task(&mut task);

        assert_eq!(task.num_cpus, Some(2.0));
        assert_eq!(task.ram_mb, Some(64));
        assert_eq!(task.disk_mb, Some(32));
        assert_eq!(
            task.requested_ports,
            Some(BTreeSet::from(["health".to_string()]))
        );
    }

    #[test]
    fn claims_override_legacy_fields() {
        let mut task = TaskConfig::new(JobKey::new("role", "dev", "job"))
            .with_resource(Resource::NumCpus(2.0));
        task.num_cpus = Some(3.0);
        LegacyResourceBackfill.backfill_task(&mut task);
        assert_eq!(task.num_cpus, Some(2.0));
        assert_eq!(task.resources, vec![Resource::NumCpus(2.0)]);
    }

    #[test]
    fn mixed_representations_get_every_claim() {
        let mut task = TaskConfig::new(JobKey::new("role", "dev", "job"))
            .with_resource(Resource::RamMb(64))
            .with_resource(Resource::DiskMb(64));
        task.num_cpus = Some(1.0);
        task.requested_ports = Some(BTreeSet::from(["http".to_string()]));
        LegacyResourceBackfill.backfill_task(&mut task);

        assert_eq!(
            task.resources,
            vec![
                Resource::RamMb(64),
                Resource::DiskMb(64),
                Resource::NumCpus(1.0),
                Resource::NamedPort("http".into()),
            ]
        );
        assert_eq!(task.ram_mb, Some(64));
        assert_eq!(task.disk_mb, Some(64));
    }

    #[test]
    fn port_claims_replace_requested_ports() {
        let mut task = TaskConfig::new(JobKey::new("role", "dev", "job"))
            .with_resource(Resource::NamedPort("admin".into()));
        task.requested_ports = Some(BTreeSet::from(["http".to_string()]));
        LegacyResourceBackfill.backfill_task(&mut task);

        assert_eq!(task.resources, vec![Resource::NamedPort("admin".into())]);
        assert_eq!(
            task.requested_ports,
            Some(BTreeSet::from(["admin".to_string()]))
        );
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut task = legacy_task();
        LegacyResourceBackfill.backfill_task(&mut task);
        let once = task.clone();
        LegacyResourceBackfill.backfill_task(&mut task);
        assert_eq!(task, once);
    }
}
