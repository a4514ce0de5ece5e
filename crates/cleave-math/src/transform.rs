use crate::{DQuat, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Rigid local transform of a hierarchy node (rotation then translation, no scale).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: DQuat,
}

impl Transform {
    pub fn new(translation: Vector3, rotation: DQuat) -> Self {
        Self {
            translation,
            rotation: rotation.normalize(),
        }
    }

    pub fn identity() -> Self {
        Self {
            translation: Vector3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }

    pub fn from_translation(t: Vector3) -> Self {
        Self {
            translation: t,
            rotation: DQuat::IDENTITY,
        }
    }

    pub fn from_rotation(rotation: DQuat) -> Self {
        Self::new(Vector3::ZERO, rotation)
    }

    pub fn transform_point(&self, p: Point3) -> Point3 {
        self.rotation * p + self.translation
    }

    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        self.rotation * v
    }

    pub fn inverse_transform_point(&self, p: Point3) -> Point3 {
        self.rotation.inverse() * (p - self.translation)
    }

    pub fn inverse_transform_vector(&self, v: Vector3) -> Vector3 {
        self.rotation.inverse() * v
    }

    /// Compose: apply `self` first, then `other`.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            translation: other.transform_point(self.translation),
            rotation: (other.rotation * self.rotation).normalize(),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec3;

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        let p = dvec3(1.0, 2.0, 3.0);
        let result = t.transform_point(p);
        assert!((result - p).length() < 1e-10);
    }

    #[test]
    fn test_translation() {
        let t = Transform::from_translation(dvec3(10.0, 20.0, 30.0));
        let p = dvec3(1.0, 2.0, 3.0);
        let result = t.transform_point(p);
        assert!((result - dvec3(11.0, 22.0, 33.0)).length() < 1e-10);
    }

    #[test]
    fn test_inverse() {
        let t = Transform::new(
            dvec3(10.0, 20.0, 30.0),
            DQuat::from_rotation_y(0.7) * DQuat::from_rotation_x(-1.2),
        );
        let p = dvec3(1.0, 2.0, 3.0);
        assert!((t.inverse_transform_point(t.transform_point(p)) - p).length() < 1e-10);
        let v = dvec3(0.0, -1.0, 4.0);
        assert!((t.inverse_transform_vector(t.transform_vector(v)) - v).length() < 1e-10);
    }

    #[test]
    fn test_then_applies_self_first() {
        let a = Transform::new(dvec3(1.0, 0.0, 0.0), DQuat::from_rotation_z(0.5));
        let b = Transform::new(dvec3(0.0, -2.0, 4.0), DQuat::from_rotation_x(1.1));
        let p = dvec3(0.3, -0.6, 2.0);
        let composed = a.then(&b).transform_point(p);
        let stepwise = b.transform_point(a.transform_point(p));
        assert!((composed - stepwise).length() < 1e-10);
    }
}
