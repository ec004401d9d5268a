//! Error types produced while building suspension models, solving geometry and
//! extracting characteristics.

use thiserror::Error;

use crate::characteristics::Characteristic;
use crate::hardpoints::{Hardpoint, TopologyKind};
use crate::vehicle::CornerId;

/// Error returned when hardpoint or simulation input cannot form a valid model.
///
/// These errors are raised before any simulation runs.
///
/// # Examples
///
/// ```
/// use suspx::{ConfigurationError, Hardpoint, HardpointSet, SemiTrailingLink};
///
/// let error = SemiTrailingLink::new(&HardpointSet::new())
///     .expect_err("empty hardpoint set is rejected");
/// assert!(matches!(
///     error,
///     ConfigurationError::MissingHardpoint { .. }
/// ));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    /// Returned when a topology requires a hardpoint that was not supplied.
    #[error("{topology} geometry requires hardpoint `{hardpoint}`")]
    MissingHardpoint {
        /// Topology being constructed.
        topology: TopologyKind,
        /// Name of the absent hardpoint.
        hardpoint: Hardpoint,
    },
    /// Returned when a hardpoint has a NaN or infinite coordinate.
    #[error("hardpoint `{0}` has a non-finite coordinate")]
    NonFiniteHardpoint(Hardpoint),
    /// Returned when the two endpoints of a rigid link coincide.
    #[error("link between `{start}` and `{end}` has zero length")]
    ZeroLengthLink {
        /// First endpoint of the degenerate link.
        start: Hardpoint,
        /// Second endpoint of the degenerate link.
        end: Hardpoint,
    },
    /// Returned when three points that must span a rigid body are collinear.
    #[error("hardpoints `{0}`, `{1}` and `{2}` are collinear")]
    CollinearHardpoints(Hardpoint, Hardpoint, Hardpoint),
    /// Returned when a point that must swing about an axis lies on it.
    #[error("hardpoint `{0}` lies on its own rotation axis")]
    PointOnAxis(Hardpoint),
    /// Returned when only one end of the drive axle is supplied.
    #[error("drive axle needs both `axle_inboard` and `axle_outboard`, only `{0}` given")]
    IncompleteAxle(Hardpoint),
    /// Returned when neither corner of an axle end is described.
    #[error("no hardpoints supplied for either {0} corner")]
    MissingAxleEnd(&'static str),
    /// Returned when the tire radius is zero, negative or not finite.
    #[error("tire radius must be positive (received {0})")]
    NonPositiveTireRadius(f64),
    /// Returned when the travel sweep bounds cannot produce any sample.
    #[error("travel sweep needs finite bounds and at least one step (start {start}, end {end}, steps {steps})")]
    InvalidSweep {
        /// First travel value in millimetres.
        start: f64,
        /// Last travel value in millimetres.
        end: f64,
        /// Number of requested samples.
        steps: usize,
    },
}

/// Error returned when a travel value has no physically valid pose.
///
/// The simulation driver treats this as recoverable and records a gap.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeometryError {
    /// Returned when the mechanism cannot reach the requested travel.
    #[error("travel {travel:+.3} mm is outside the mechanism's range: {reason}")]
    OutOfRange {
        /// Requested wheel-center travel in millimetres.
        travel: f64,
        /// Which constraint could not be satisfied.
        reason: &'static str,
    },
}

impl GeometryError {
    /// Shorthand for an [`GeometryError::OutOfRange`] value.
    #[must_use]
    pub const fn out_of_range(travel: f64, reason: &'static str) -> Self {
        Self::OutOfRange { travel, reason }
    }
}

/// Error returned when a characteristic cannot be derived from a step.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CharacteristicError {
    /// The characteristic does not exist for this corner, for example caster
    /// on a non-steered semi-trailing link or axle plunge without a drive axle.
    #[error("{characteristic} is not defined for {corner} ({topology})")]
    NotApplicable {
        /// Requested characteristic.
        characteristic: Characteristic,
        /// Corner the step belongs to.
        corner: CornerId,
        /// Topology of that corner.
        topology: TopologyKind,
    },
    /// The step lacks structure its topology guarantees. This indicates a
    /// programming error in whoever built the step.
    #[error("malformed step for {characteristic}: {reason}")]
    MalformedStep {
        /// Requested characteristic.
        characteristic: Characteristic,
        /// Description of the missing or degenerate data.
        reason: String,
    },
}

/// Error returned by the JSON loading helpers.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON for the expected schema.
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),
    /// The document parsed but describes an invalid model.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
