pub mod aabb;
pub mod plane;
pub mod transform;

pub use glam::{DQuat, DVec2, DVec3};
pub use aabb::Aabb3;
pub use plane::{Plane, PlaneFrame, Side};
pub use transform::Transform;

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;
