//! Fundamental geometric types for suspension modelling.
//!
//! All lengths are millimetres in the vehicle frame: x forward, y left and
//! z up. Angles passed to or returned from this module are radians.

use nalgebra::{Matrix3, Rotation3, Unit, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Absolute tolerance used for degeneracy checks and intersection clamping.
pub const TOLERANCE: f64 = 1.0e-9;

/// Position in three dimensional space measured in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance along the longitudinal X axis (positive forward).
    pub x: f64,
    /// Distance along the lateral Y axis (positive left).
    pub y: f64,
    /// Distance along the vertical Z axis (positive up).
    pub z: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.to_vector() - self.to_vector()).norm()
    }

    /// Reflect the point across the vehicle centre plane (y = 0).
    #[must_use]
    pub const fn mirrored(self) -> Self {
        Self::new(self.x, -self.y, self.z)
    }

    /// Returns `true` when every coordinate is finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vector3<f64>> for Point {
    fn from(value: Vector3<f64>) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

impl From<Point> for Vector3<f64> {
    fn from(value: Point) -> Self {
        value.to_vector()
    }
}

impl From<[f64; 3]> for Point {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use suspx::point;
///
/// let ball_joint = point(0.0, 500.0, 300.0);
/// assert_eq!(ball_joint.z, 300.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64, z: f64) -> Point {
    Point::new(x, y, z)
}

/// An infinite line used as a rotation axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Axis {
    /// A point on the axis.
    pub origin: Vector3<f64>,
    /// Unit direction of the axis.
    pub direction: Unit<Vector3<f64>>,
}

impl Axis {
    /// Build the axis running from `start` through `end`.
    ///
    /// Returns `None` when the two points coincide.
    #[must_use]
    pub fn through(start: Vector3<f64>, end: Vector3<f64>) -> Option<Self> {
        let direction = Unit::try_new(end - start, TOLERANCE)?;
        Some(Self {
            origin: start,
            direction,
        })
    }

    /// Orthogonal projection of `point` onto the axis.
    #[must_use]
    pub fn project(&self, point: &Vector3<f64>) -> Vector3<f64> {
        let along = (point - self.origin).dot(self.direction.as_ref());
        self.origin + self.direction.into_inner() * along
    }

    /// Rotate `point` about the axis by `angle` using the right-hand rule.
    #[must_use]
    pub fn rotate(&self, point: &Vector3<f64>, angle: f64) -> Vector3<f64> {
        let rotation = Rotation3::from_axis_angle(&self.direction, angle);
        self.origin + rotation * (point - self.origin)
    }
}

/// Circle swept by a point rotating about an axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    /// Centre of the circle.
    pub center: Vector3<f64>,
    /// Radius of the circle.
    pub radius: f64,
    /// Unit vector from the centre towards the parameter origin (`t = 0`).
    u: Vector3<f64>,
    /// Second in-plane unit vector, `normal × u`.
    v: Vector3<f64>,
}

impl Circle {
    /// Circle traced by `point` when rotated about `axis`.
    ///
    /// Returns `None` when the point lies on the axis.
    #[must_use]
    pub fn about_axis(axis: &Axis, point: &Vector3<f64>) -> Option<Self> {
        let center = axis.project(point);
        let radius = (point - center).norm();
        Self::new(center, axis.direction, radius, point)
    }

    /// Circle with the given centre, normal and radius. The parameter origin
    /// (`t = 0`) is the circle point nearest to `toward`.
    ///
    /// Returns `None` when the radius is not positive or `toward` lies on the
    /// circle's axis.
    #[must_use]
    pub fn new(
        center: Vector3<f64>,
        normal: Unit<Vector3<f64>>,
        radius: f64,
        toward: &Vector3<f64>,
    ) -> Option<Self> {
        if radius < TOLERANCE {
            return None;
        }
        let normal = normal.into_inner();
        let radial = toward - center;
        let u = Unit::try_new(radial - normal * radial.dot(&normal), TOLERANCE)?.into_inner();
        let v = normal.cross(&u);
        Some(Self {
            center,
            radius,
            u,
            v,
        })
    }

    /// Point on the circle at parameter angle `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Vector3<f64> {
        self.center + (self.u * t.cos() + self.v * t.sin()) * self.radius
    }

    /// Intersect the circle with a sphere.
    ///
    /// Returns both solutions (which coincide when the sphere is tangent) or
    /// `None` when the circle and sphere do not meet.
    #[must_use]
    pub fn intersect_sphere(
        &self,
        sphere_center: &Vector3<f64>,
        sphere_radius: f64,
    ) -> Option<[Vector3<f64>; 2]> {
        let offset = self.center - sphere_center;
        let a = 2.0 * self.radius * offset.dot(&self.u);
        let b = 2.0 * self.radius * offset.dot(&self.v);
        let c = sphere_radius * sphere_radius - offset.norm_squared() - self.radius * self.radius;
        let amplitude = a.hypot(b);
        if amplitude < TOLERANCE {
            return None;
        }
        let ratio = c / amplitude;
        let slack = TOLERANCE * sphere_radius.max(1.0);
        if ratio.abs() > 1.0 + slack {
            return None;
        }
        let phase = b.atan2(a);
        let spread = ratio.clamp(-1.0, 1.0).acos();
        Some([self.point_at(phase + spread), self.point_at(phase - spread)])
    }
}

/// Pick the candidate closest to `reference`.
#[must_use]
pub fn closest_to(candidates: [Vector3<f64>; 2], reference: &Vector3<f64>) -> Vector3<f64> {
    let [first, second] = candidates;
    if (first - reference).norm_squared() <= (second - reference).norm_squared() {
        first
    } else {
        second
    }
}

/// Orthonormal frame attached to three non-collinear points of a rigid body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Frame origin (the first defining point).
    origin: Vector3<f64>,
    /// Columns are the frame's unit axes expressed in the vehicle frame.
    basis: Matrix3<f64>,
}

impl Frame {
    /// Build a frame from three points. Returns `None` when they are collinear.
    #[must_use]
    pub fn from_points(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> Option<Self> {
        let e1 = Unit::try_new(b - a, TOLERANCE)?.into_inner();
        let e3 = Unit::try_new(e1.cross(&(c - a)), TOLERANCE)?.into_inner();
        let e2 = e3.cross(&e1);
        Some(Self {
            origin: *a,
            basis: Matrix3::from_columns(&[e1, e2, e3]),
        })
    }

    /// Map a point rigidly attached to `self` onto its position in `target`.
    #[must_use]
    pub fn carry(&self, target: &Frame, point: &Vector3<f64>) -> Vector3<f64> {
        let local = self.basis.transpose() * (point - self.origin);
        target.origin + target.basis * local
    }
}

/// Line in the front-view (y, z) plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line2 {
    /// A point on the line.
    pub point: Vector2<f64>,
    /// Direction of the line (not necessarily unit length).
    pub direction: Vector2<f64>,
}

impl Line2 {
    /// Line through two points. Returns `None` when they coincide.
    #[must_use]
    pub fn through(a: Vector2<f64>, b: Vector2<f64>) -> Option<Self> {
        let direction = b - a;
        if direction.norm() < TOLERANCE {
            return None;
        }
        Some(Self {
            point: a,
            direction,
        })
    }

    /// Intersection with another line, or `None` when they are parallel.
    #[must_use]
    pub fn intersect(&self, other: &Line2) -> Option<Vector2<f64>> {
        let denominator = cross2(&self.direction, &other.direction);
        let scale = self.direction.norm() * other.direction.norm();
        if denominator.abs() <= TOLERANCE * scale {
            return None;
        }
        let t = cross2(&(other.point - self.point), &other.direction) / denominator;
        Some(self.point + self.direction * t)
    }
}

/// Scalar cross product of two planar vectors.
fn cross2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Project a vehicle-frame vector into the front-view (y, z) plane.
#[must_use]
pub fn front_view(vector: &Vector3<f64>) -> Vector2<f64> {
    Vector2::new(vector.y, vector.z)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn point_to_vector_roundtrip() {
        let origin = Point::new(1.0, 2.0, 3.0);
        let vector: Vector3<f64> = origin.into();
        assert_eq!(vector, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(Point::from(vector), origin);
    }

    #[test]
    fn mirroring_flips_lateral_coordinate() {
        assert_eq!(point(10.0, 450.0, -3.0).mirrored(), point(10.0, -450.0, -3.0));
    }

    #[test]
    fn rotation_about_axis_follows_right_hand_rule() {
        let axis = Axis::through(Vector3::zeros(), Vector3::x()).expect("distinct points");
        let rotated = axis.rotate(&Vector3::y(), FRAC_PI_2);
        assert_relative_eq!(rotated, Vector3::z(), epsilon = 1.0e-12);
    }

    #[test]
    fn coincident_points_do_not_define_an_axis() {
        assert!(Axis::through(Vector3::x(), Vector3::x()).is_none());
    }

    #[test]
    fn circle_sphere_intersection_lies_on_both() {
        let axis = Axis::through(Vector3::zeros(), Vector3::z()).expect("distinct points");
        let circle = Circle::about_axis(&axis, &Vector3::new(1.0, 0.0, 0.0)).expect("off axis");
        let center = Vector3::new(1.0, 1.0, 0.0);
        let hits = circle.intersect_sphere(&center, 1.0).expect("sphere meets circle");
        for hit in hits {
            assert_relative_eq!(hit.norm(), 1.0, epsilon = 1.0e-12);
            assert_relative_eq!((hit - center).norm(), 1.0, epsilon = 1.0e-12);
        }
        assert!(circle.intersect_sphere(&Vector3::new(5.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn closest_candidate_is_selected() {
        let picked = closest_to([Vector3::x(), -Vector3::x()], &Vector3::new(-0.5, 0.1, 0.0));
        assert_eq!(picked, -Vector3::x());
    }

    #[test]
    fn frame_carry_preserves_relative_geometry() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 0.0, 0.0);
        let c = Vector3::new(0.0, 1.0, 0.0);
        let from = Frame::from_points(&a, &b, &c).expect("non-collinear");
        let axis = Axis::through(Vector3::new(3.0, 0.0, 0.0), Vector3::new(3.0, 0.0, 1.0))
            .expect("distinct points");
        let turn = 0.7;
        let to = Frame::from_points(
            &axis.rotate(&a, turn),
            &axis.rotate(&b, turn),
            &axis.rotate(&c, turn),
        )
        .expect("non-collinear");
        let attached = Vector3::new(0.3, -0.4, 2.0);
        assert_relative_eq!(
            from.carry(&to, &attached),
            axis.rotate(&attached, turn),
            epsilon = 1.0e-12
        );
    }

    #[test]
    fn front_view_lines_intersect() {
        let first = Line2::through(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)).expect("line");
        let second = Line2::through(Vector2::new(2.0, 0.0), Vector2::new(1.0, 1.0)).expect("line");
        let hit = first.intersect(&second).expect("lines cross");
        assert_relative_eq!(hit, Vector2::new(1.0, 1.0), epsilon = 1.0e-12);
        let parallel =
            Line2::through(Vector2::new(0.0, 1.0), Vector2::new(1.0, 2.0)).expect("line");
        assert!(first.intersect(&parallel).is_none());
    }
}
