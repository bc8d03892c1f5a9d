//! Port allocation for the backend process.

use std::fmt;
use std::net::TcpListener;
use std::ops::RangeInclusive;

use tracing::debug;

use crate::error::LaunchError;

/// Inclusive range of candidate ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub min: u16,
    pub max: u16,
}

impl PortRange {
    pub const DEFAULT: Self = Self {
        min: 31337,
        max: 31400,
    };

    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Number of ports in the range; zero when `min > max`.
    pub fn len(&self) -> usize {
        self.ports().count()
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub const fn ports(&self) -> RangeInclusive<u16> {
        self.min..=self.max
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Check if a port is available by attempting to bind to it.
///
/// The listener is dropped before returning, which releases the port.
pub fn is_port_available(port: u16) -> bool {
    match TcpListener::bind(("127.0.0.1", port)) {
        Ok(listener) => listener.local_addr().is_ok(),
        Err(_) => false,
    }
}

/// Return the first port in `range` that can be bound on loopback.
///
/// Ports are probed once each, in ascending order.
pub fn allocate_port(range: PortRange) -> Result<u16, LaunchError> {
    allocate_port_with(range, is_port_available)
}

/// [`allocate_port`] with a caller-supplied availability probe.
pub fn allocate_port_with(
    range: PortRange,
    mut probe: impl FnMut(u16) -> bool,
) -> Result<u16, LaunchError> {
    let mut probes = 0;
    for port in range.ports() {
        probes += 1;
        if probe(port) {
            debug!(port, probes, "Allocated available port");
            return Ok(port);
        }
        debug!(port, "Port unavailable, skipping");
    }

    Err(LaunchError::PortExhausted {
        min: range.min,
        max: range.max,
        probes,
    })
}
