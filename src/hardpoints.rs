//! Hardpoint model and the two supported suspension topologies.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;
use crate::geometry::{Axis, Circle, Frame, Point};
use crate::linkage::Linkage;
use crate::vehicle::AxleEnd;

/// Named attachment and reference points of a suspension corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hardpoint {
    /// Chassis pivot of the upper arm, front leg.
    UpperFrontPivot,
    /// Chassis pivot of the upper arm, rear leg.
    UpperRearPivot,
    /// Upper ball joint on the knuckle.
    UpperBallJoint,
    /// Chassis pivot of the lower arm, front leg.
    LowerFrontPivot,
    /// Chassis pivot of the lower arm, rear leg.
    LowerRearPivot,
    /// Lower ball joint on the knuckle.
    LowerBallJoint,
    /// Inner tie-rod end on the steering rack.
    TieRodInner,
    /// Outer tie-rod end on the steering arm.
    TieRodOuter,
    /// Inboard pivot of the semi-trailing link.
    PivotInboard,
    /// Outboard pivot of the semi-trailing link.
    PivotOutboard,
    /// Wheel center.
    WheelCenter,
    /// Point on the wheel spin axis inboard of the wheel center.
    Spindle,
    /// Inboard constant-velocity joint of the half-shaft (chassis side).
    AxleInboard,
    /// Outboard constant-velocity joint of the half-shaft (wheel side).
    AxleOutboard,
}

impl Hardpoint {
    /// Name used in configuration documents.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UpperFrontPivot => "upper_front_pivot",
            Self::UpperRearPivot => "upper_rear_pivot",
            Self::UpperBallJoint => "upper_ball_joint",
            Self::LowerFrontPivot => "lower_front_pivot",
            Self::LowerRearPivot => "lower_rear_pivot",
            Self::LowerBallJoint => "lower_ball_joint",
            Self::TieRodInner => "tie_rod_inner",
            Self::TieRodOuter => "tie_rod_outer",
            Self::PivotInboard => "pivot_inboard",
            Self::PivotOutboard => "pivot_outboard",
            Self::WheelCenter => "wheel_center",
            Self::Spindle => "spindle",
            Self::AxleInboard => "axle_inboard",
            Self::AxleOutboard => "axle_outboard",
        }
    }
}

impl fmt::Display for Hardpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of named hardpoint coordinates.
///
/// Deserialises from a map of hardpoint name to `[x, y, z]` in millimetres.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Hardpoint, [f64; 3]>", into = "BTreeMap<Hardpoint, [f64; 3]>")]
pub struct HardpointSet {
    /// Coordinates keyed by hardpoint.
    points: BTreeMap<Hardpoint, Point>,
}

impl HardpointSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// # Examples
    /// ```
    /// use suspx::{point, Hardpoint, HardpointSet};
    ///
    /// let points = HardpointSet::new().with(Hardpoint::WheelCenter, point(0.0, 560.0, 170.0));
    /// assert_eq!(points.len(), 1);
    /// ```
    #[must_use]
    pub fn with(mut self, hardpoint: Hardpoint, position: Point) -> Self {
        self.insert(hardpoint, position);
        self
    }

    /// Insert or replace a coordinate.
    pub fn insert(&mut self, hardpoint: Hardpoint, position: Point) {
        self.points.insert(hardpoint, position);
    }

    /// Remove a coordinate, returning it when present.
    pub fn remove(&mut self, hardpoint: Hardpoint) -> Option<Point> {
        self.points.remove(&hardpoint)
    }

    /// Coordinate of `hardpoint`, if present.
    #[must_use]
    pub fn get(&self, hardpoint: Hardpoint) -> Option<Point> {
        self.points.get(&hardpoint).copied()
    }

    /// Returns `true` when `hardpoint` is present.
    #[must_use]
    pub fn contains(&self, hardpoint: Hardpoint) -> bool {
        self.points.contains_key(&hardpoint)
    }

    /// Number of stored points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` when no point is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the stored points in hardpoint order.
    pub fn iter(&self) -> impl Iterator<Item = (Hardpoint, Point)> + '_ {
        self.points.iter().map(|(&hardpoint, &position)| (hardpoint, position))
    }

    /// Copy of the set reflected across the vehicle centre plane.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            points: self
                .iter()
                .map(|(hardpoint, position)| (hardpoint, position.mirrored()))
                .collect(),
        }
    }

    /// Coordinate of a hardpoint `topology` cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingHardpoint`] when absent.
    pub fn require(
        &self,
        topology: TopologyKind,
        hardpoint: Hardpoint,
    ) -> Result<Vector3<f64>, ConfigurationError> {
        self.get(hardpoint)
            .map(Point::to_vector)
            .ok_or(ConfigurationError::MissingHardpoint {
                topology,
                hardpoint,
            })
    }

    /// Reject any point with a non-finite coordinate.
    fn ensure_finite(&self) -> Result<(), ConfigurationError> {
        match self.iter().find(|(_, position)| !position.is_finite()) {
            Some((hardpoint, _)) => Err(ConfigurationError::NonFiniteHardpoint(hardpoint)),
            None => Ok(()),
        }
    }
}

impl From<BTreeMap<Hardpoint, [f64; 3]>> for HardpointSet {
    fn from(value: BTreeMap<Hardpoint, [f64; 3]>) -> Self {
        Self {
            points: value
                .into_iter()
                .map(|(hardpoint, coordinates)| (hardpoint, Point::from(coordinates)))
                .collect(),
        }
    }
}

impl From<HardpointSet> for BTreeMap<Hardpoint, [f64; 3]> {
    fn from(value: HardpointSet) -> Self {
        value
            .iter()
            .map(|(hardpoint, position)| (hardpoint, [position.x, position.y, position.z]))
            .collect()
    }
}

impl FromIterator<(Hardpoint, Point)> for HardpointSet {
    fn from_iter<I: IntoIterator<Item = (Hardpoint, Point)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// The closed set of supported suspension topologies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyKind {
    /// Double wishbone with a steering tie rod.
    DoubleAArm,
    /// Single link rotating about a fixed skewed axis.
    SemiTrailingLink,
}

impl TopologyKind {
    /// Topology used at the given axle end.
    #[must_use]
    pub const fn for_axle_end(end: AxleEnd) -> Self {
        match end {
            AxleEnd::Front => Self::DoubleAArm,
            AxleEnd::Rear => Self::SemiTrailingLink,
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoubleAArm => f.write_str("double A-arm"),
            Self::SemiTrailingLink => f.write_str("semi-trailing link"),
        }
    }
}

/// Look up both ends of a link and register it with its static length.
fn link(
    linkage: &mut Linkage,
    points: &HardpointSet,
    topology: TopologyKind,
    start: Hardpoint,
    end: Hardpoint,
) -> Result<(), ConfigurationError> {
    let length = (points.require(topology, end)? - points.require(topology, start)?).norm();
    linkage.add_link(start, end, length)?;
    Ok(())
}

/// Validate the optional drive axle and return its static half-shaft length.
fn axle_length(
    points: &HardpointSet,
    topology: TopologyKind,
) -> Result<Option<f64>, ConfigurationError> {
    match (
        points.contains(Hardpoint::AxleInboard),
        points.contains(Hardpoint::AxleOutboard),
    ) {
        (false, false) => Ok(None),
        (true, false) => Err(ConfigurationError::IncompleteAxle(Hardpoint::AxleInboard)),
        (false, true) => Err(ConfigurationError::IncompleteAxle(Hardpoint::AxleOutboard)),
        (true, true) => {
            let length = (points.require(topology, Hardpoint::AxleOutboard)?
                - points.require(topology, Hardpoint::AxleInboard)?)
            .norm();
            if length <= crate::geometry::TOLERANCE {
                return Err(ConfigurationError::ZeroLengthLink {
                    start: Hardpoint::AxleInboard,
                    end: Hardpoint::AxleOutboard,
                });
            }
            Ok(Some(length))
        }
    }
}

/// Double A-arm (double wishbone) corner geometry.
///
/// The knuckle carries the two ball joints, the outer tie-rod end, the wheel
/// center, the spindle point and, for driven corners, the outboard axle joint.
#[derive(Clone, Debug)]
pub struct DoubleAArm {
    /// Static hardpoint coordinates.
    points: HardpointSet,
    /// Rigid links implied by the hardpoints.
    linkage: Linkage,
    /// Chassis pivot axis of the upper arm.
    upper_axis: Axis,
    /// Chassis pivot axis of the lower arm.
    lower_axis: Axis,
    /// Circle swept by the upper ball joint.
    upper_circle: Circle,
    /// Distance between the ball joints.
    kingpin_length: f64,
    /// Distance between the tie-rod ends.
    tie_rod_length: f64,
    /// Position of the outer tie-rod end along the kingpin, measured from the
    /// lower ball joint.
    tie_rod_offset: f64,
    /// Distance of the outer tie-rod end from the kingpin axis.
    tie_rod_radius: f64,
    /// Knuckle frame at static ride height.
    knuckle: Frame,
    /// Static half-shaft length for driven corners.
    axle_length: Option<f64>,
}

impl DoubleAArm {
    /// Hardpoints every double A-arm corner must provide.
    pub const REQUIRED: [Hardpoint; 10] = [
        Hardpoint::UpperFrontPivot,
        Hardpoint::UpperRearPivot,
        Hardpoint::UpperBallJoint,
        Hardpoint::LowerFrontPivot,
        Hardpoint::LowerRearPivot,
        Hardpoint::LowerBallJoint,
        Hardpoint::TieRodInner,
        Hardpoint::TieRodOuter,
        Hardpoint::WheelCenter,
        Hardpoint::Spindle,
    ];

    /// Build the topology from static hardpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a required point is missing or
    /// non-finite, a link has zero length, a ball joint sits on its pivot
    /// axis or the knuckle points are collinear.
    pub fn new(points: &HardpointSet) -> Result<Self, ConfigurationError> {
        const KIND: TopologyKind = TopologyKind::DoubleAArm;
        for hardpoint in Self::REQUIRED {
            points.require(KIND, hardpoint)?;
        }
        points.ensure_finite()?;
        let axle_length = axle_length(points, KIND)?;

        let mut linkage = Linkage::new();
        let rigid = [
            (Hardpoint::UpperFrontPivot, Hardpoint::UpperRearPivot),
            (Hardpoint::UpperFrontPivot, Hardpoint::UpperBallJoint),
            (Hardpoint::UpperRearPivot, Hardpoint::UpperBallJoint),
            (Hardpoint::LowerFrontPivot, Hardpoint::LowerRearPivot),
            (Hardpoint::LowerFrontPivot, Hardpoint::LowerBallJoint),
            (Hardpoint::LowerRearPivot, Hardpoint::LowerBallJoint),
            (Hardpoint::UpperBallJoint, Hardpoint::LowerBallJoint),
            (Hardpoint::UpperBallJoint, Hardpoint::TieRodOuter),
            (Hardpoint::LowerBallJoint, Hardpoint::TieRodOuter),
            (Hardpoint::TieRodInner, Hardpoint::TieRodOuter),
            (Hardpoint::Spindle, Hardpoint::WheelCenter),
        ];
        for (start, end) in rigid {
            link(&mut linkage, points, KIND, start, end)?;
        }
        for carried in Self::carried_points(axle_length.is_some()) {
            for anchor in Self::KNUCKLE {
                link(&mut linkage, points, KIND, anchor, carried)?;
            }
        }

        let upper_ball_joint = points.require(KIND, Hardpoint::UpperBallJoint)?;
        let lower_ball_joint = points.require(KIND, Hardpoint::LowerBallJoint)?;
        let tie_rod_outer = points.require(KIND, Hardpoint::TieRodOuter)?;
        let tie_rod_inner = points.require(KIND, Hardpoint::TieRodInner)?;

        let upper_axis = Axis::through(
            points.require(KIND, Hardpoint::UpperFrontPivot)?,
            points.require(KIND, Hardpoint::UpperRearPivot)?,
        )
        .ok_or(ConfigurationError::ZeroLengthLink {
            start: Hardpoint::UpperFrontPivot,
            end: Hardpoint::UpperRearPivot,
        })?;
        let lower_axis = Axis::through(
            points.require(KIND, Hardpoint::LowerFrontPivot)?,
            points.require(KIND, Hardpoint::LowerRearPivot)?,
        )
        .ok_or(ConfigurationError::ZeroLengthLink {
            start: Hardpoint::LowerFrontPivot,
            end: Hardpoint::LowerRearPivot,
        })?;
        let upper_circle = Circle::about_axis(&upper_axis, &upper_ball_joint)
            .ok_or(ConfigurationError::PointOnAxis(Hardpoint::UpperBallJoint))?;
        if Circle::about_axis(&lower_axis, &lower_ball_joint).is_none() {
            return Err(ConfigurationError::PointOnAxis(Hardpoint::LowerBallJoint));
        }

        let knuckle = Frame::from_points(&upper_ball_joint, &lower_ball_joint, &tie_rod_outer)
            .ok_or(ConfigurationError::CollinearHardpoints(
                Hardpoint::UpperBallJoint,
                Hardpoint::LowerBallJoint,
                Hardpoint::TieRodOuter,
            ))?;
        let kingpin = Axis::through(lower_ball_joint, upper_ball_joint).ok_or(
            ConfigurationError::ZeroLengthLink {
                start: Hardpoint::UpperBallJoint,
                end: Hardpoint::LowerBallJoint,
            },
        )?;
        let tie_rod_offset = (tie_rod_outer - lower_ball_joint).dot(kingpin.direction.as_ref());
        let tie_rod_radius = (tie_rod_outer - kingpin.project(&tie_rod_outer)).norm();

        Ok(Self {
            points: points.clone(),
            linkage,
            upper_axis,
            lower_axis,
            upper_circle,
            kingpin_length: (upper_ball_joint - lower_ball_joint).norm(),
            tie_rod_length: (tie_rod_outer - tie_rod_inner).norm(),
            tie_rod_offset,
            tie_rod_radius,
            knuckle,
            axle_length,
        })
    }

    /// Knuckle points that define its rigid frame, in frame order.
    pub(crate) const KNUCKLE: [Hardpoint; 3] = [
        Hardpoint::UpperBallJoint,
        Hardpoint::LowerBallJoint,
        Hardpoint::TieRodOuter,
    ];

    /// Points carried rigidly by the knuckle besides its frame points.
    pub(crate) fn carried_points(driven: bool) -> Vec<Hardpoint> {
        let mut carried = vec![Hardpoint::WheelCenter, Hardpoint::Spindle];
        if driven {
            carried.push(Hardpoint::AxleOutboard);
        }
        carried
    }

    /// Static hardpoints.
    #[must_use]
    pub fn hardpoints(&self) -> &HardpointSet {
        &self.points
    }

    /// Rigid links of this corner.
    #[must_use]
    pub fn linkage(&self) -> &Linkage {
        &self.linkage
    }

    /// Pivot axis of the upper arm.
    #[must_use]
    pub fn upper_pivot_axis(&self) -> &Axis {
        &self.upper_axis
    }

    /// Pivot axis of the lower arm.
    #[must_use]
    pub fn lower_pivot_axis(&self) -> &Axis {
        &self.lower_axis
    }

    /// Circle swept by the upper ball joint.
    pub(crate) fn upper_circle(&self) -> &Circle {
        &self.upper_circle
    }

    /// Distance between the upper and lower ball joints.
    #[must_use]
    pub fn kingpin_length(&self) -> f64 {
        self.kingpin_length
    }

    /// Length of the tie rod.
    #[must_use]
    pub fn tie_rod_length(&self) -> f64 {
        self.tie_rod_length
    }

    /// Offset of the outer tie-rod end along the kingpin from the lower ball
    /// joint, and its distance from the kingpin axis.
    #[must_use]
    pub fn steering_arm(&self) -> (f64, f64) {
        (self.tie_rod_offset, self.tie_rod_radius)
    }

    /// Static knuckle frame.
    pub(crate) fn knuckle(&self) -> &Frame {
        &self.knuckle
    }

    /// Static half-shaft length for driven corners.
    #[must_use]
    pub fn axle_length(&self) -> Option<f64> {
        self.axle_length
    }
}

/// Semi-trailing link corner geometry.
///
/// The whole unsprung assembly rotates about the axis through the two pivots.
#[derive(Clone, Debug)]
pub struct SemiTrailingLink {
    /// Static hardpoint coordinates.
    points: HardpointSet,
    /// Rigid links implied by the hardpoints.
    linkage: Linkage,
    /// Fixed rotation axis.
    axis: Axis,
    /// Static half-shaft length for driven corners.
    axle_length: Option<f64>,
}

impl SemiTrailingLink {
    /// Hardpoints every semi-trailing link corner must provide.
    pub const REQUIRED: [Hardpoint; 4] = [
        Hardpoint::PivotInboard,
        Hardpoint::PivotOutboard,
        Hardpoint::WheelCenter,
        Hardpoint::Spindle,
    ];

    /// Build the topology from static hardpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a required point is missing or
    /// non-finite, the pivots coincide or the wheel center lies on the axis.
    pub fn new(points: &HardpointSet) -> Result<Self, ConfigurationError> {
        const KIND: TopologyKind = TopologyKind::SemiTrailingLink;
        for hardpoint in Self::REQUIRED {
            points.require(KIND, hardpoint)?;
        }
        points.ensure_finite()?;
        let axle_length = axle_length(points, KIND)?;

        let mut linkage = Linkage::new();
        link(
            &mut linkage,
            points,
            KIND,
            Hardpoint::PivotInboard,
            Hardpoint::PivotOutboard,
        )?;
        link(
            &mut linkage,
            points,
            KIND,
            Hardpoint::Spindle,
            Hardpoint::WheelCenter,
        )?;
        for carried in Self::carried_points(axle_length.is_some()) {
            link(&mut linkage, points, KIND, Hardpoint::PivotInboard, carried)?;
            link(&mut linkage, points, KIND, Hardpoint::PivotOutboard, carried)?;
        }

        let axis = Axis::through(
            points.require(KIND, Hardpoint::PivotInboard)?,
            points.require(KIND, Hardpoint::PivotOutboard)?,
        )
        .ok_or(ConfigurationError::ZeroLengthLink {
            start: Hardpoint::PivotInboard,
            end: Hardpoint::PivotOutboard,
        })?;
        if Circle::about_axis(&axis, &points.require(KIND, Hardpoint::WheelCenter)?).is_none() {
            return Err(ConfigurationError::PointOnAxis(Hardpoint::WheelCenter));
        }

        Ok(Self {
            points: points.clone(),
            linkage,
            axis,
            axle_length,
        })
    }

    /// Points that rotate with the link.
    pub(crate) fn carried_points(driven: bool) -> Vec<Hardpoint> {
        let mut carried = vec![Hardpoint::WheelCenter, Hardpoint::Spindle];
        if driven {
            carried.push(Hardpoint::AxleOutboard);
        }
        carried
    }

    /// Static hardpoints.
    #[must_use]
    pub fn hardpoints(&self) -> &HardpointSet {
        &self.points
    }

    /// Rigid links of this corner.
    #[must_use]
    pub fn linkage(&self) -> &Linkage {
        &self.linkage
    }

    /// The fixed rotation axis, oriented from the inboard to the outboard pivot.
    #[must_use]
    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Static half-shaft length for driven corners.
    #[must_use]
    pub fn axle_length(&self) -> Option<f64> {
        self.axle_length
    }
}

/// A corner's suspension geometry, tagged by topology.
#[derive(Clone, Debug)]
pub enum Topology {
    /// Double A-arm geometry.
    DoubleAArm(DoubleAArm),
    /// Semi-trailing link geometry.
    SemiTrailingLink(SemiTrailingLink),
}

impl Topology {
    /// Build the topology mandated for `end` from static hardpoints.
    ///
    /// # Errors
    ///
    /// Propagates the [`ConfigurationError`] of the chosen variant.
    pub fn for_axle_end(end: AxleEnd, points: &HardpointSet) -> Result<Self, ConfigurationError> {
        match TopologyKind::for_axle_end(end) {
            TopologyKind::DoubleAArm => DoubleAArm::new(points).map(Self::DoubleAArm),
            TopologyKind::SemiTrailingLink => {
                SemiTrailingLink::new(points).map(Self::SemiTrailingLink)
            }
        }
    }

    /// Which variant this is.
    #[must_use]
    pub fn kind(&self) -> TopologyKind {
        match self {
            Self::DoubleAArm(_) => TopologyKind::DoubleAArm,
            Self::SemiTrailingLink(_) => TopologyKind::SemiTrailingLink,
        }
    }

    /// Static hardpoints.
    #[must_use]
    pub fn hardpoints(&self) -> &HardpointSet {
        match self {
            Self::DoubleAArm(geometry) => geometry.hardpoints(),
            Self::SemiTrailingLink(geometry) => geometry.hardpoints(),
        }
    }

    /// Rigid links of this corner.
    #[must_use]
    pub fn linkage(&self) -> &Linkage {
        match self {
            Self::DoubleAArm(geometry) => geometry.linkage(),
            Self::SemiTrailingLink(geometry) => geometry.linkage(),
        }
    }

    /// Static half-shaft length for driven corners.
    #[must_use]
    pub fn axle_length(&self) -> Option<f64> {
        match self {
            Self::DoubleAArm(geometry) => geometry.axle_length(),
            Self::SemiTrailingLink(geometry) => geometry.axle_length(),
        }
    }
}
