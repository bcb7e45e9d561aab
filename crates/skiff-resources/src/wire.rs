//! Offer-protocol resource descriptors.
//!
//! Only the shape needed to hand a footprint to the cluster agent lives here:
//! a named scalar or a named list of inclusive port ranges.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An inclusive range of ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    /// First port in the range.
    pub begin: u16,
    /// Last port in the range.
    pub end: u16,
}

impl PortRange {
    /// Creates a range covering `begin..=end`.
    #[must_use]
    pub const fn new(begin: u16, end: u16) -> Self {
        Self { begin, end }
    }
}

/// Value of a wire resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireValue {
    /// A single quantity.
    Scalar {
        /// The quantity.
        value: f64,
    },
    /// A set of port ranges.
    Ranges {
        /// Sorted, non-overlapping, non-adjacent ranges.
        ranges: Vec<PortRange>,
    },
}

/// A named resource as exchanged with cluster agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResource {
    /// Wire name, e.g. `cpus` or `ports`.
    pub name: String,
    /// Resource value.
    #[serde(flatten)]
    pub value: WireValue,
}

impl WireResource {
    /// Creates a scalar resource.
    #[must_use]
    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: WireValue::Scalar { value },
        }
    }

    /// Creates a ranges resource.
    #[must_use]
    pub fn ranges(name: impl Into<String>, ranges: Vec<PortRange>) -> Self {
        Self {
            name: name.into(),
            value: WireValue::Ranges { ranges },
        }
    }

    /// Returns the scalar value, if this is a scalar resource.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<f64> {
        match self.value {
            WireValue::Scalar { value } => Some(value),
            WireValue::Ranges { .. } => None,
        }
    }
}

/// Coalesces ports into sorted inclusive ranges.
///
/// Duplicates are ignored and adjacent ports are merged, so `[80, 81, 82, 90]`
/// becomes `[80-82, 90-90]`.
#[must_use]
pub fn to_ranges(ports: impl IntoIterator<Item = u16>) -> Vec<PortRange> {
    let sorted: BTreeSet<u16> = ports.into_iter().collect();
    let mut ranges: Vec<PortRange> = Vec::new();
    for port in sorted {
        match ranges.last_mut() {
            Some(last) if last.end.checked_add(1) == Some(port) => last.end = port,
            _ => ranges.push(PortRange::new(port, port)),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResourceVector;
    use test_case::test_case;

    #[test_case(vec![], vec![] ; "empty")]
    #[test_case(vec![80], vec![PortRange::new(80, 80)] ; "single")]
    #[test_case(vec![82, 80, 81], vec![PortRange::new(80, 82)] ; "unsorted run")]
    #[test_case(vec![80, 80, 81], vec![PortRange::new(80, 81)] ; "duplicates")]
    #[test_case(vec![80, 82], vec![PortRange::new(80, 80), PortRange::new(82, 82)] ; "gap")]
    #[test_case(
        vec![80, 81, 82, 100],
        vec![PortRange::new(80, 82), PortRange::new(100, 100)] ;
        "run and isolated port"
    )]
    #[test_case(vec![65534, 65535], vec![PortRange::new(65534, 65535)] ; "top of range")]
    fn coalesces_ports(ports: Vec<u16>, expected: Vec<PortRange>) {
        assert_eq!(to_ranges(ports), expected);
    }

    #[test]
    fn vector_emits_cpus_disk_mem_in_order() {
        let v = ResourceVector::from_megabytes(1.5, 1024, 2048, 0);
        let wire = v.to_wire_resources([]);
        let names: Vec<_> = wire.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["cpus", "disk", "mem"]);
        assert_eq!(wire[0].as_scalar(), Some(1.5));
        assert_eq!(wire[1].as_scalar(), Some(2048.0));
        assert_eq!(wire[2].as_scalar(), Some(1024.0));
    }

    #[test]
    fn vector_emits_ports_only_when_selected() {
        let v = ResourceVector::from_megabytes(1.0, 1, 1, 3);
        let wire = v.to_wire_resources([31000, 31001, 31005]);
        assert_eq!(wire.len(), 4);
        assert_eq!(
            wire[3],
            WireResource::ranges(
                "ports",
                vec![PortRange::new(31000, 31001), PortRange::new(31005, 31005)]
            )
        );
    }

    #[test]
    fn wire_resource_serialization() {
        let json = serde_json::to_value(WireResource::scalar("cpus", 2.0)).unwrap_or_default();
        assert_eq!(json["name"], "cpus");
        assert_eq!(json["type"], "SCALAR");
        assert_eq!(json["value"], 2.0);

        let ranges = WireResource::ranges("ports", vec![PortRange::new(1, 2)]);
        let json = serde_json::to_value(ranges).unwrap_or_default();
        assert_eq!(json["type"], "RANGES");
        assert_eq!(json["ranges"][0]["begin"], 1);
    }
}
