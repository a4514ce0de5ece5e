use cleave_core::traits::Validate;
use cleave_core::{CleaveError, Result};
use serde::{Deserialize, Serialize};

use crate::{Point2, Point3, Transform, Vector3};

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Positive,
    Negative,
    OnPlane,
}

/// An oriented plane `dot(normal, p) + offset = 0` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    normal: Vector3,
    offset: f64,
}

impl Plane {
    /// Build a plane from a (not necessarily unit) normal and a signed offset.
    ///
    /// The offset is rescaled together with the normal, so `new(2 * n, 2 * d)`
    /// describes the same plane as `new(n, d)`.
    pub fn new(normal: Vector3, offset: f64) -> Result<Self> {
        let length = normal.length();
        if !offset.is_finite() || !length.is_finite() || length <= f64::EPSILON {
            return Err(CleaveError::DegeneratePlane);
        }
        Ok(Self {
            normal: normal / length,
            offset: offset / length,
        })
    }

    /// Build a plane through `point` with the given normal direction.
    pub fn from_point_normal(point: Point3, normal: Vector3) -> Result<Self> {
        if !point.is_finite() {
            return Err(CleaveError::DegeneratePlane);
        }
        let normal = normal.try_normalize().ok_or(CleaveError::DegeneratePlane)?;
        Ok(Self {
            normal,
            offset: -normal.dot(point),
        })
    }

    pub fn xy() -> Self {
        Self {
            normal: Vector3::Z,
            offset: 0.0,
        }
    }

    pub fn xz() -> Self {
        Self {
            normal: Vector3::Y,
            offset: 0.0,
        }
    }

    pub fn yz() -> Self {
        Self {
            normal: Vector3::X,
            offset: 0.0,
        }
    }

    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// The point of the plane closest to the origin.
    pub fn origin(&self) -> Point3 {
        -self.offset * self.normal
    }

    /// Signed distance from a point to this plane.
    pub fn signed_distance(&self, point: Point3) -> f64 {
        self.normal.dot(point) + self.offset
    }

    /// Classify a point, treating `|distance| <= epsilon` as lying on the plane.
    pub fn classify(&self, point: Point3, epsilon: f64) -> Side {
        let d = self.signed_distance(point);
        if d.abs() <= epsilon {
            Side::OnPlane
        } else if d > 0.0 {
            Side::Positive
        } else {
            Side::Negative
        }
    }

    /// The same plane with the opposite orientation.
    ///
    /// Negation is exact, so `p.flipped().signed_distance(x)` is bit-for-bit
    /// `-p.signed_distance(x)`.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Translate the plane by `distance` along its own normal.
    pub fn shifted(&self, distance: f64) -> Self {
        Self {
            normal: self.normal,
            offset: self.offset - distance,
        }
    }

    /// Express this plane in the local space of a node placed by `transform`.
    pub fn to_local(&self, transform: &Transform) -> Self {
        let normal = transform.inverse_transform_vector(self.normal).normalize();
        let point = transform.inverse_transform_point(self.origin());
        Self {
            normal,
            offset: -normal.dot(point),
        }
    }

    /// An orthonormal 2D coordinate frame spanning the plane.
    pub fn frame(&self) -> PlaneFrame {
        PlaneFrame::new(self.origin(), self.normal)
    }
}

impl Validate for Plane {
    /// Rejects planes whose fields were set without going through a constructor.
    fn validate(&self) -> Result<()> {
        let length = self.normal.length();
        if !self.offset.is_finite() || !length.is_finite() || (length - 1.0).abs() > 1e-9 {
            return Err(CleaveError::DegeneratePlane);
        }
        Ok(())
    }
}

/// Right-handed in-plane axes: `u.cross(v) == normal`, so counter-clockwise
/// polygons in frame coordinates face along the plane normal.
#[derive(Debug, Clone, Copy)]
pub struct PlaneFrame {
    pub origin: Point3,
    pub u: Vector3,
    pub v: Vector3,
    pub normal: Vector3,
}

impl PlaneFrame {
    fn new(origin: Point3, normal: Vector3) -> Self {
        let reference = if normal.x.abs() < 0.9 {
            Vector3::X
        } else {
            Vector3::Y
        };
        let u = normal.cross(reference).normalize();
        let v = normal.cross(u);
        Self {
            origin,
            u,
            v,
            normal,
        }
    }

    pub fn to_local(&self, point: Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(self.u), d.dot(self.v))
    }
}
