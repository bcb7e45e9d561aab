//! The resource vector and its algebra.
//!
//! A [`ResourceVector`] is a point in (CPU, RAM, disk, port count) space. It is
//! a plain `Copy` value: every operation returns a new vector.
//!
//! Two comparisons are provided:
//! - [`PartialOrd`] is the true product order; incomparable pairs yield `None`.
//!   [`ResourceVector::dominates_or_equal`] is built on it.
//! - [`ResourceVector::compare`] is a total-order adapter that collapses
//!   incomparable pairs to `Ordering::Equal`. It is only suitable where some
//!   answer is always required; it must not be used to decide whether one
//!   footprint fits in another.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use skiff_model::{Resource, ResourceType, TaskConfig};

use crate::error::{ResourceError, Result};
use crate::wire::{to_ranges, WireResource};

/// Bytes per mebibyte.
pub const MIB: i64 = 1024 * 1024;

/// An immutable quantity of CPU, RAM, disk and ports.
///
/// RAM and disk are held in bytes so that sums and differences never round.
/// Components are non-negative for any vector built from a task or a config;
/// [`ResourceVector::subtract`] may produce negative components, which only make
/// sense as a delta (see [`ResourceVector::is_non_negative`]).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(from = "MegabyteVector", into = "MegabyteVector")]
pub struct ResourceVector {
    cpus: f64,
    ram_bytes: i64,
    disk_bytes: i64,
    num_ports: i32,
}

impl ResourceVector {
    /// The empty vector.
    pub const ZERO: Self = Self::new(0.0, 0, 0, 0);

    /// Smallest footprint an executor can run in: 0.01 CPU, 256 MiB RAM, 1 MiB disk.
    pub const MIN_EXECUTOR_FLOOR: Self = Self::new(0.01, 256 * MIB, MIB, 0);

    /// Creates a vector from raw components.
    ///
    /// Negative zero CPU is stored as positive zero.
    #[must_use]
    pub const fn new(cpus: f64, ram_bytes: i64, disk_bytes: i64, num_ports: i32) -> Self {
        Self {
            cpus: cpus + 0.0,
            ram_bytes,
            disk_bytes,
            num_ports,
        }
    }

    /// Creates a vector with RAM and disk given in mebibytes.
    #[must_use]
    pub fn from_megabytes(cpus: f64, ram_mb: u64, disk_mb: u64, num_ports: u32) -> Self {
        Self::new(
            cpus,
            megabytes_to_bytes(ram_mb),
            megabytes_to_bytes(disk_mb),
            i32::try_from(num_ports).unwrap_or(i32::MAX),
        )
    }

    /// Extracts the footprint declared by a task's resource claims.
    ///
    /// CPU, RAM and disk must each be claimed exactly once; the port count is
    /// the number of named-port claims.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MalformedTask`] if a required claim is missing
    /// or repeated.
    pub fn from_task(task: &TaskConfig) -> Result<Self> {
        let cpus = exactly_one(task, ResourceType::Cpus, |r| match r {
            Resource::NumCpus(v) => Some(*v),
            _ => None,
        })?;
        let ram_mb = exactly_one(task, ResourceType::RamMb, |r| match r {
            Resource::RamMb(v) => Some(*v),
            _ => None,
        })?;
        let disk_mb = exactly_one(task, ResourceType::DiskMb, |r| match r {
            Resource::DiskMb(v) => Some(*v),
            _ => None,
        })?;
        let ports = task.resources_of(ResourceType::Ports).count();

        Ok(Self::new(
            cpus,
            megabytes_to_bytes(ram_mb),
            megabytes_to_bytes(disk_mb),
            i32::try_from(ports).unwrap_or(i32::MAX),
        ))
    }

    /// CPU cores.
    #[must_use]
    pub const fn cpus(&self) -> f64 {
        self.cpus
    }

    /// RAM in bytes.
    #[must_use]
    pub const fn ram_bytes(&self) -> i64 {
        self.ram_bytes
    }

    /// Disk in bytes.
    #[must_use]
    pub const fn disk_bytes(&self) -> i64 {
        self.disk_bytes
    }

    /// Number of ports.
    #[must_use]
    pub const fn num_ports(&self) -> i32 {
        self.num_ports
    }

    /// RAM in (possibly fractional) mebibytes.
    #[must_use]
    pub fn ram_mb(&self) -> f64 {
        self.ram_bytes as f64 / MIB as f64
    }

    /// Disk in (possibly fractional) mebibytes.
    #[must_use]
    pub fn disk_mb(&self) -> f64 {
        self.disk_bytes as f64 / MIB as f64
    }

    /// Returns true if no component is negative.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        self.cpus >= 0.0 && self.ram_bytes >= 0 && self.disk_bytes >= 0 && self.num_ports >= 0
    }

    /// Component-wise difference. The result may have negative components.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        Self::new(
            self.cpus - other.cpus,
            self.ram_bytes.saturating_sub(other.ram_bytes),
            self.disk_bytes.saturating_sub(other.disk_bytes),
            self.num_ports.saturating_sub(other.num_ports),
        )
    }

    /// Sums all vectors, starting from [`ResourceVector::ZERO`].
    #[must_use]
    pub fn sum<'a>(vectors: impl IntoIterator<Item = &'a Self>) -> Self {
        vectors.into_iter().fold(Self::ZERO, |acc, v| acc + *v)
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn elementwise_max(a: &Self, b: &Self) -> Self {
        Self::new(
            a.cpus.max(b.cpus),
            a.ram_bytes.max(b.ram_bytes),
            a.disk_bytes.max(b.disk_bytes),
            a.num_ports.max(b.num_ports),
        )
    }

    /// Charges an executor's overhead to this task footprint.
    ///
    /// The overhead is added as a flat tax, then the result is raised to at
    /// least [`ResourceVector::MIN_EXECUTOR_FLOOR`] so tiny tasks still leave
    /// room for the executor itself.
    #[must_use]
    pub fn with_executor_overhead(&self, overhead: &Self) -> Self {
        Self::elementwise_max(&(*self + *overhead), &Self::MIN_EXECUTOR_FLOOR)
    }

    /// Returns true if every component of `self` is at least the matching
    /// component of `other`.
    #[must_use]
    pub fn dominates_or_equal(&self, other: &Self) -> bool {
        matches!(
            self.partial_cmp(other),
            Some(Ordering::Greater | Ordering::Equal)
        )
    }

    /// Total-order adapter over the product order.
    ///
    /// Dimensions are compared in the order disk, RAM, ports, CPU. If every
    /// dimension is equal the result is `Equal`; if all differing dimensions
    /// agree in direction that direction is returned; otherwise the pair is
    /// incomparable and the result is `Equal`.
    #[must_use]
    pub fn compare(a: &Self, b: &Self) -> Ordering {
        let mut differing = a
            .dimension_orderings(b)
            .into_iter()
            .filter(|o| o.is_ne());
        match differing.next() {
            None => Ordering::Equal,
            Some(first) if differing.all(|o| o == first) => first,
            Some(_) => Ordering::Equal,
        }
    }

    /// Adapts this footprint to offer-protocol resources.
    ///
    /// Emits `cpus`, `disk` and `mem` scalars and, if any ports were selected,
    /// a `ports` ranges resource.
    #[must_use]
    pub fn to_wire_resources(&self, selected_ports: impl IntoIterator<Item = u16>) -> Vec<WireResource> {
        let mut resources = vec![
            WireResource::scalar(ResourceType::Cpus.wire_name(), self.cpus),
            WireResource::scalar(ResourceType::DiskMb.wire_name(), self.disk_mb()),
            WireResource::scalar(ResourceType::RamMb.wire_name(), self.ram_mb()),
        ];
        let ranges = to_ranges(selected_ports);
        if !ranges.is_empty() {
            resources.push(WireResource::ranges(ResourceType::Ports.wire_name(), ranges));
        }
        resources
    }

    fn dimension_orderings(&self, other: &Self) -> [Ordering; 4] {
        [
            self.disk_bytes.cmp(&other.disk_bytes),
            self.ram_bytes.cmp(&other.ram_bytes),
            self.num_ports.cmp(&other.num_ports),
            self.cpus.total_cmp(&other.cpus),
        ]
    }
}

/// Config-file form of a vector, with RAM and disk in mebibytes.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MegabyteVector {
    #[serde(default)]
    num_cpus: f64,
    #[serde(default)]
    ram_mb: f64,
    #[serde(default)]
    disk_mb: f64,
    #[serde(default)]
    num_ports: i32,
}

impl From<MegabyteVector> for ResourceVector {
    #[allow(clippy::cast_possible_truncation)]
    fn from(v: MegabyteVector) -> Self {
        let mib = MIB as f64;
        Self::new(
            v.num_cpus,
            (v.ram_mb * mib).round() as i64,
            (v.disk_mb * mib).round() as i64,
            v.num_ports,
        )
    }
}

impl From<ResourceVector> for MegabyteVector {
    fn from(v: ResourceVector) -> Self {
        Self {
            num_cpus: v.cpus,
            ram_mb: v.ram_mb(),
            disk_mb: v.disk_mb(),
            num_ports: v.num_ports,
        }
    }
}

fn megabytes_to_bytes(mb: u64) -> i64 {
    i64::try_from(mb).unwrap_or(i64::MAX).saturating_mul(MIB)
}

fn exactly_one<T>(
    task: &TaskConfig,
    resource_type: ResourceType,
    extract: impl Fn(&Resource) -> Option<T>,
) -> Result<T> {
    let mut claims = task.resources_of(resource_type).filter_map(extract);
    let first = claims.next().ok_or_else(|| ResourceError::MalformedTask {
        reason: format!("missing {resource_type} resource"),
    })?;
    if claims.next().is_some() {
        return Err(ResourceError::MalformedTask {
            reason: format!("multiple {resource_type} resources"),
        });
    }
    Ok(first)
}

impl PartialEq for ResourceVector {
    fn eq(&self, other: &Self) -> bool {
        self.dimension_orderings(other)
            .iter()
            .all(|o| o.is_eq())
    }
}

impl Eq for ResourceVector {}

impl Hash for ResourceVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cpus.to_bits().hash(state);
        self.ram_bytes.hash(state);
        self.disk_bytes.hash(state);
        self.num_ports.hash(state);
    }
}

impl PartialOrd for ResourceVector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let orderings = self.dimension_orderings(other);
        let greater = orderings.contains(&Ordering::Greater);
        let less = orderings.contains(&Ordering::Less);
        match (greater, less) {
            (false, false) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Greater),
            (false, true) => Some(Ordering::Less),
            (true, true) => None,
        }
    }
}

/// Component-wise sum.
impl Add for ResourceVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.cpus + rhs.cpus,
            self.ram_bytes.saturating_add(rhs.ram_bytes),
            self.disk_bytes.saturating_add(rhs.disk_bytes),
            self.num_ports.saturating_add(rhs.num_ports),
        )
    }
}

impl Add<&ResourceVector> for ResourceVector {
    type Output = Self;

    fn add(self, rhs: &Self) -> Self {
        self + *rhs
    }
}

impl Sub for ResourceVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.subtract(&rhs)
    }
}

impl Sum for ResourceVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + v)
    }
}

impl<'a> Sum<&'a ResourceVector> for ResourceVector {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + v)
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cpus={} ram={}MiB disk={}MiB ports={}",
            self.cpus,
            self.ram_mb(),
            self.disk_mb(),
            self.num_ports
        )
    }
}
