//! World-space math shared between the engine and the server.
//!
//! Positions use `f64`: a player far from spawn must still floor to the
//! correct block column.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 3D Vector - world position
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Creates from array
    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    /// Block column X (rounded toward negative infinity).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn floor_x(self) -> i64 {
        self.x.floor() as i64
    }

    /// Block row Y (rounded toward negative infinity).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn floor_y(self) -> i64 {
        self.y.floor() as i64
    }

    /// Block column Z (rounded toward negative infinity).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn floor_z(self) -> i64 {
        self.z.floor() as i64
    }

    /// Distance squared (avoids sqrt)
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let d = self - other;
        d.x * d.x + d.y * d.y + d.z * d.z
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
