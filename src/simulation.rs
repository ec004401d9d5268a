//! Travel sweeps over one corner or one axle half.

use nalgebra::{Unit, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::characteristics::{spin_axis, Characteristic};
use crate::errors::{CharacteristicError, ConfigurationError, GeometryError};
use crate::geometry::{front_view, Axis, Line2, TOLERANCE};
use crate::hardpoints::{Hardpoint, TopologyKind};
use crate::step::Step;
use crate::vehicle::{AxleEnd, Corner, CornerId, Vehicle};

/// Ordered, inclusive sequence of wheel-center travel values.
///
/// # Examples
/// ```
/// use suspx::TravelSweep;
///
/// let sweep = TravelSweep { start: -25.0, end: 25.0, steps: 51 };
/// let values = sweep.values().expect("valid sweep");
/// assert_eq!(values.len(), 51);
/// assert_eq!(values[25], 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TravelSweep {
    /// First travel value in millimetres.
    pub start: f64,
    /// Last travel value in millimetres.
    pub end: f64,
    /// Number of samples, endpoints included.
    pub steps: usize,
}

impl Default for TravelSweep {
    fn default() -> Self {
        Self {
            start: -25.0,
            end: 25.0,
            steps: 51,
        }
    }
}

impl TravelSweep {
    /// Check that the sweep produces at least one finite sample.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSweep`] for non-finite bounds or
    /// zero steps.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.start.is_finite() && self.end.is_finite() && self.steps > 0 {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidSweep {
                start: self.start,
                end: self.end,
                steps: self.steps,
            })
        }
    }

    /// Travel values in sweep order. A single step yields `start`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSweep`] when the sweep is invalid.
    pub fn values(&self) -> Result<Vec<f64>, ConfigurationError> {
        self.validate()?;
        if self.steps == 1 {
            return Ok(vec![self.start]);
        }
        let increment = (self.end - self.start) / (self.steps - 1) as f64;
        Ok((0..self.steps)
            .map(|index| {
                if index + 1 == self.steps {
                    self.end
                } else {
                    self.start + increment * index as f64
                }
            })
            .collect())
    }
}

/// A travel value the mechanism could not reach.
#[derive(Clone, Debug, PartialEq)]
pub struct Gap {
    /// Requested travel in millimetres.
    pub travel: f64,
    /// Why no pose exists.
    pub error: GeometryError,
}

/// Steps and gaps of one corner over a sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepResult {
    /// Corner that was swept.
    pub corner: CornerId,
    /// Solved steps in sweep order.
    pub steps: Vec<Step>,
    /// Travel values that produced no step.
    pub gaps: Vec<Gap>,
}

impl SweepResult {
    /// Empty result for `corner`.
    fn new(corner: CornerId) -> Self {
        Self {
            corner,
            steps: Vec::new(),
            gaps: Vec::new(),
        }
    }

    /// Solve `travel`, keeping the previous step as hint, and file the result.
    /// Returns whether a step was added.
    fn record(&mut self, corner: &Corner, travel: f64) -> bool {
        let hint = self.steps.last().map(Step::hint);
        match corner.solve(travel, hint.as_ref()) {
            Ok(step) => {
                self.steps.push(step);
                true
            }
            Err(error) => {
                tracing::debug!(corner = %self.corner, travel, %error, "travel skipped");
                self.gaps.push(Gap { travel, error });
                false
            }
        }
    }

    /// Series of `characteristic` aligned to the solved travel values.
    ///
    /// # Errors
    ///
    /// Returns the first characteristic error met; a corner either has a
    /// characteristic at every step or at none.
    pub fn series(
        &self,
        characteristic: Characteristic,
    ) -> Result<Vec<(f64, f64)>, CharacteristicError> {
        self.steps
            .iter()
            .map(|step| Ok((step.travel, characteristic.evaluate(step)?)))
            .collect()
    }
}

/// Sweep of a single corner through its travel range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelAttitudeSimulation {
    /// Travel values to visit.
    pub sweep: TravelSweep,
}

impl WheelAttitudeSimulation {
    /// Create a simulation over `sweep`.
    #[must_use]
    pub const fn new(sweep: TravelSweep) -> Self {
        Self { sweep }
    }

    /// Solve `corner` at every travel value.
    ///
    /// Each solve is hinted with the previous successful step. Unreachable
    /// values are recorded as gaps and the sweep carries on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSweep`] when the sweep is invalid.
    pub fn run(&self, corner: &Corner) -> Result<SweepResult, ConfigurationError> {
        let travels = self.sweep.values()?;
        tracing::debug!(corner = %corner.id(), samples = travels.len(), "wheel attitude sweep");
        let mut result = SweepResult::new(corner.id());
        for travel in travels {
            result.record(corner, travel);
        }
        tracing::debug!(
            corner = %corner.id(),
            steps = result.steps.len(),
            gaps = result.gaps.len(),
            "wheel attitude sweep finished"
        );
        Ok(result)
    }
}

/// How the two sides of an axle half move together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JackingMotion {
    /// Both wheels move by the same travel.
    #[default]
    Heave,
    /// The right wheel moves opposite to the left.
    Roll,
}

impl JackingMotion {
    /// Travel applied to the right corner when the left moves by `travel`.
    #[must_use]
    pub fn right_travel(self, travel: f64) -> f64 {
        match self {
            Self::Heave => travel,
            Self::Roll => -travel,
        }
    }
}

/// Point in the front-view (y, z) plane, in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrontViewPoint {
    /// Lateral coordinate.
    pub y: f64,
    /// Vertical coordinate.
    pub z: f64,
}

impl From<Vector2<f64>> for FrontViewPoint {
    fn from(vector: Vector2<f64>) -> Self {
        Self {
            y: vector.x,
            z: vector.y,
        }
    }
}

/// Coupled quantities of an axle half at one travel value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct JackingSample {
    /// Travel of the left corner in millimetres.
    pub travel: f64,
    /// Front-view roll centre.
    pub roll_center: FrontViewPoint,
    /// Vertical over inboard slope of the left contact-to-instant-centre line.
    pub left_jacking: f64,
    /// Vertical over inboard slope of the right contact-to-instant-centre line.
    pub right_jacking: f64,
}

/// Output of a jacking run over one axle half.
#[derive(Clone, Debug, PartialEq)]
pub struct JackingResult {
    /// Left corner sweep.
    pub left: SweepResult,
    /// Right corner sweep.
    pub right: SweepResult,
    /// Coupled samples for travel values where both sides are defined.
    pub coupled: Vec<JackingSample>,
}

/// Sweep of both corners of an axle half.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JackingSimulation {
    /// Travel values applied to the left corner.
    pub sweep: TravelSweep,
    /// Relation between left and right travel.
    pub motion: JackingMotion,
}

impl JackingSimulation {
    /// Create a jacking simulation.
    #[must_use]
    pub const fn new(sweep: TravelSweep, motion: JackingMotion) -> Self {
        Self { sweep, motion }
    }

    /// Solve both corners of `end` at every travel value, left then right,
    /// and derive the roll centre and jacking coefficients.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSweep`] when the sweep is invalid.
    pub fn run(
        &self,
        vehicle: &Vehicle,
        end: AxleEnd,
    ) -> Result<JackingResult, ConfigurationError> {
        let travels = self.sweep.values()?;
        let (left_corner, right_corner) = vehicle.half(end);
        tracing::debug!(
            half = end.name(),
            motion = ?self.motion,
            samples = travels.len(),
            "jacking sweep"
        );
        let mut left = SweepResult::new(left_corner.id());
        let mut right = SweepResult::new(right_corner.id());
        let mut coupled = Vec::new();
        for travel in travels {
            let left_solved = left.record(left_corner, travel);
            let right_solved = right.record(right_corner, self.motion.right_travel(travel));
            if !(left_solved && right_solved) {
                continue;
            }
            if let (Some(left_step), Some(right_step)) = (left.steps.last(), right.steps.last()) {
                match couple(travel, left_step, right_step) {
                    Some(sample) => coupled.push(sample),
                    None => tracing::debug!(travel, "no roll centre at this travel"),
                }
            }
        }
        tracing::debug!(
            half = end.name(),
            coupled = coupled.len(),
            "jacking sweep finished"
        );
        Ok(JackingResult {
            left,
            right,
            coupled,
        })
    }
}

/// Roll centre and jacking coefficients from a left and right step solved at
/// the same sweep position.
fn couple(travel: f64, left: &Step, right: &Step) -> Option<JackingSample> {
    let left_line = contact_line(left)?;
    let right_line = contact_line(right)?;
    let roll_center = left_line.intersect(&right_line)?;
    Some(JackingSample {
        travel,
        roll_center: roll_center.into(),
        left_jacking: jacking_coefficient(left, &left_line)?,
        right_jacking: jacking_coefficient(right, &right_line)?,
    })
}

/// Tire contact point: the wheel center moved by the tire radius towards the
/// ground, within the wheel plane.
#[must_use]
pub fn contact_point(step: &Step) -> Option<Vector3<f64>> {
    let wheel_center = step.vector(Hardpoint::WheelCenter)?;
    let axis = spin_axis(step, Characteristic::Camber).ok()?;
    let down = -Vector3::z();
    let radial = Unit::try_new(down - axis * down.dot(&axis), TOLERANCE)?;
    Some(wheel_center + radial.into_inner() * step.tire_radius)
}

/// Front-view instant centre of a corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InstantCenter {
    /// Finite intersection point.
    Point(Vector2<f64>),
    /// The constraint lines are parallel and meet at infinity along this
    /// direction.
    Direction(Vector2<f64>),
}

/// Front-view instant centre of the wheel carrier in the plane of the wheel
/// center.
#[must_use]
pub fn instant_center(step: &Step) -> Option<InstantCenter> {
    let wheel_center = step.vector(Hardpoint::WheelCenter)?;
    match step.topology {
        TopologyKind::DoubleAArm => {
            let upper = arm_line(
                step,
                Hardpoint::UpperFrontPivot,
                Hardpoint::UpperRearPivot,
                Hardpoint::UpperBallJoint,
                &wheel_center,
            )?;
            let lower = arm_line(
                step,
                Hardpoint::LowerFrontPivot,
                Hardpoint::LowerRearPivot,
                Hardpoint::LowerBallJoint,
                &wheel_center,
            )?;
            Some(match upper.intersect(&lower) {
                Some(point) => InstantCenter::Point(point),
                None => InstantCenter::Direction(upper.direction),
            })
        }
        TopologyKind::SemiTrailingLink => {
            let axis = Axis::through(
                step.vector(Hardpoint::PivotInboard)?,
                step.vector(Hardpoint::PivotOutboard)?,
            )?;
            if axis.direction.x.abs() <= TOLERANCE {
                let direction = front_view(axis.direction.as_ref());
                return Some(InstantCenter::Direction(direction));
            }
            Some(InstantCenter::Point(front_view(&axis_at_station(
                &axis,
                &wheel_center,
            ))))
        }
    }
}

/// Front-view trace of an A-arm plane on the transverse plane through the
/// wheel center.
///
/// The arm plane holds both pivots and the ball joint. Its trace passes
/// through the point where the pivot axis crosses the wheel center station.
/// An axis without a fore-aft component never crosses that station, so the
/// line through the ball joint and the projected axis is used instead.
fn arm_line(
    step: &Step,
    front: Hardpoint,
    rear: Hardpoint,
    ball_joint: Hardpoint,
    wheel_center: &Vector3<f64>,
) -> Option<Line2> {
    let rear_pivot = step.vector(rear)?;
    let ball_joint = step.vector(ball_joint)?;
    let axis = Axis::through(rear_pivot, step.vector(front)?)?;
    let pivot = axis_at_station(&axis, wheel_center);
    if axis.direction.x.abs() <= TOLERANCE {
        return Line2::through(front_view(&ball_joint), front_view(&pivot));
    }

    let normal = axis.direction.cross(&(ball_joint - rear_pivot));
    let direction = front_view(&normal.cross(&Vector3::x()));
    if direction.norm() <= TOLERANCE {
        return None;
    }
    Some(Line2 {
        point: front_view(&pivot),
        direction,
    })
}

/// Point where `axis` crosses the transverse plane through `station`, or the
/// closest axis point when the axis lies in that plane.
fn axis_at_station(axis: &Axis, station: &Vector3<f64>) -> Vector3<f64> {
    let direction = axis.direction.into_inner();
    if direction.x.abs() <= TOLERANCE {
        return axis.project(station);
    }
    axis.origin + direction * ((station.x - axis.origin.x) / direction.x)
}

/// Front-view line from the tire contact point through the instant centre.
#[must_use]
pub fn contact_line(step: &Step) -> Option<Line2> {
    let contact = front_view(&contact_point(step)?);
    match instant_center(step)? {
        InstantCenter::Point(point) => Line2::through(contact, point),
        InstantCenter::Direction(direction) => Some(Line2 {
            point: contact,
            direction,
        }),
    }
}

/// Ratio of vertical to inboard component of the contact line. Positive when
/// a lateral tire force towards the vehicle lifts the body.
fn jacking_coefficient(step: &Step, line: &Line2) -> Option<f64> {
    let inboard = line.direction.x * -step.corner.side.outboard_sign();
    if inboard.abs() <= TOLERANCE {
        return None;
    }
    Some(line.direction.y / inboard)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::point;
    use crate::hardpoints::HardpointSet;
    use crate::vehicle::{CornerSpec, Side};

    #[test]
    fn sweep_values_include_both_ends() {
        let sweep = TravelSweep {
            start: -10.0,
            end: 10.0,
            steps: 5,
        };
        assert_eq!(sweep.values().expect("valid"), vec![-10.0, -5.0, 0.0, 5.0, 10.0]);
    }

    #[test]
    fn single_step_sweep_yields_start() {
        let sweep = TravelSweep {
            start: 3.0,
            end: 40.0,
            steps: 1,
        };
        assert_eq!(sweep.values().expect("valid"), vec![3.0]);
    }

    #[test]
    fn empty_or_non_finite_sweep_is_rejected() {
        let empty = TravelSweep {
            steps: 0,
            ..TravelSweep::default()
        };
        assert!(matches!(
            empty.values(),
            Err(ConfigurationError::InvalidSweep { steps: 0, .. })
        ));
        let unbounded = TravelSweep {
            end: f64::INFINITY,
            ..TravelSweep::default()
        };
        assert!(unbounded.validate().is_err());
    }

    #[test]
    fn roll_motion_opposes_right_travel() {
        assert_eq!(JackingMotion::default(), JackingMotion::Heave);
        assert_eq!(JackingMotion::Heave.right_travel(4.0), 4.0);
        assert_eq!(JackingMotion::Roll.right_travel(4.0), -4.0);
    }

    fn trailing_link_corner(side: Side) -> Corner {
        let hardpoints = HardpointSet::new()
            .with(Hardpoint::PivotInboard, point(-300.0, 150.0, 200.0))
            .with(Hardpoint::PivotOutboard, point(-250.0, 450.0, 210.0))
            .with(Hardpoint::WheelCenter, point(0.0, 600.0, 250.0))
            .with(Hardpoint::Spindle, point(0.0, 550.0, 250.0));
        let spec = CornerSpec {
            hardpoints,
            tire_radius: 250.0,
        };
        let spec = match side {
            Side::Left => spec,
            Side::Right => spec.mirrored(),
        };
        Corner::new(CornerId::new(AxleEnd::Rear, side), &spec).expect("valid corner")
    }

    #[test]
    fn contact_point_sits_below_upright_wheel() {
        let corner = trailing_link_corner(Side::Left);
        let step = corner.solve(0.0, None).expect("static");
        let contact = contact_point(&step).expect("upright wheel");
        assert_relative_eq!(contact, Vector3::new(0.0, 600.0, 0.0), epsilon = 1.0e-9);
    }

    #[test]
    fn trailing_link_instant_centre_lies_on_pivot_axis() {
        let corner = trailing_link_corner(Side::Left);
        let step = corner.solve(0.0, None).expect("static");
        match instant_center(&step) {
            Some(InstantCenter::Point(point)) => {
                // Axis crosses x = 0 at t = 6 along (50, 300, 10).
                assert_relative_eq!(point, Vector2::new(1950.0, 260.0), epsilon = 1.0e-9);
            }
            other => panic!("expected a finite instant centre, got {other:?}"),
        }
    }

    /// Double A-arm with inclined pivot axes and ball joints off the wheel
    /// center station.
    fn anti_dive_corner() -> Corner {
        let hardpoints = HardpointSet::new()
            .with(Hardpoint::UpperFrontPivot, point(120.0, 250.0, 330.0))
            .with(Hardpoint::UpperRearPivot, point(-120.0, 250.0, 290.0))
            .with(Hardpoint::UpperBallJoint, point(30.0, 500.0, 300.0))
            .with(Hardpoint::LowerFrontPivot, point(150.0, 200.0, 110.0))
            .with(Hardpoint::LowerRearPivot, point(-150.0, 200.0, 50.0))
            .with(Hardpoint::LowerBallJoint, point(-20.0, 480.0, 50.0))
            .with(Hardpoint::TieRodInner, point(80.0, 230.0, 180.0))
            .with(Hardpoint::TieRodOuter, point(80.0, 490.0, 170.0))
            .with(Hardpoint::WheelCenter, point(0.0, 560.0, 170.0))
            .with(Hardpoint::Spindle, point(0.0, 510.0, 170.0));
        let spec = CornerSpec {
            hardpoints,
            tire_radius: 280.0,
        };
        Corner::new(CornerId::new(AxleEnd::Front, Side::Left), &spec).expect("valid corner")
    }

    #[test]
    fn double_a_arm_instant_centre_lies_in_both_arm_planes() {
        let corner = anti_dive_corner();
        let step = corner.solve(0.0, None).expect("static");
        let center = match instant_center(&step) {
            Some(InstantCenter::Point(point)) => point,
            other => panic!("expected a finite instant centre, got {other:?}"),
        };
        assert_relative_eq!(
            center,
            Vector2::new(-6_891.304_347_826_087, 738.478_260_869_565_2),
            epsilon = 1.0e-6
        );

        let station = Vector3::new(0.0, center.x, center.y);
        for (front, rear, ball_joint) in [
            (
                Hardpoint::UpperFrontPivot,
                Hardpoint::UpperRearPivot,
                Hardpoint::UpperBallJoint,
            ),
            (
                Hardpoint::LowerFrontPivot,
                Hardpoint::LowerRearPivot,
                Hardpoint::LowerBallJoint,
            ),
        ] {
            let rear = step.vector(rear).expect("solved");
            let normal = (step.vector(front).expect("solved") - rear)
                .cross(&(step.vector(ball_joint).expect("solved") - rear))
                .normalize();
            assert_relative_eq!(normal.dot(&(station - rear)), 0.0, epsilon = 1.0e-6);
        }
    }

    #[test]
    fn level_arms_trace_through_the_ball_joints() {
        // With horizontal pivot axes and ball joints on the station the arm
        // plane traces reduce to the ball joint to pivot lines.
        let corner = anti_dive_corner();
        let mut spec = CornerSpec {
            hardpoints: corner.topology().hardpoints().clone(),
            tire_radius: 280.0,
        };
        for (hardpoint, position) in [
            (Hardpoint::UpperFrontPivot, point(120.0, 250.0, 310.0)),
            (Hardpoint::UpperRearPivot, point(-120.0, 250.0, 310.0)),
            (Hardpoint::UpperBallJoint, point(0.0, 500.0, 300.0)),
            (Hardpoint::LowerFrontPivot, point(150.0, 200.0, 80.0)),
            (Hardpoint::LowerRearPivot, point(-150.0, 200.0, 80.0)),
            (Hardpoint::LowerBallJoint, point(0.0, 480.0, 50.0)),
        ] {
            spec.hardpoints.insert(hardpoint, position);
        }
        let corner = Corner::new(CornerId::new(AxleEnd::Front, Side::Left), &spec)
            .expect("valid corner");
        let step = corner.solve(0.0, None).expect("static");
        let upper = Line2::through(Vector2::new(500.0, 300.0), Vector2::new(250.0, 310.0))
            .expect("distinct points");
        let lower = Line2::through(Vector2::new(480.0, 50.0), Vector2::new(200.0, 80.0))
            .expect("distinct points");
        let expected = upper.intersect(&lower).expect("arms converge");
        match instant_center(&step) {
            Some(InstantCenter::Point(point)) => {
                assert_relative_eq!(point, expected, epsilon = 1.0e-9);
            }
            other => panic!("expected a finite instant centre, got {other:?}"),
        }
    }

    #[test]
    fn gaps_are_recorded_without_aborting() {
        let corner = trailing_link_corner(Side::Left);
        let sweep = TravelSweep {
            start: 0.0,
            end: 3000.0,
            steps: 4,
        };
        let result = WheelAttitudeSimulation::new(sweep).run(&corner).expect("valid");
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.gaps.len(), 3);
        assert!(result.gaps.iter().all(|gap| gap.travel > 0.0));
    }
}
