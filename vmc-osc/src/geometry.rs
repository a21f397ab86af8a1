//! vmc-osc/src/geometry.rs
//!
//! Position and unit quaternion value types carried in every VMC transform.
//!
//! All quaternion math rounds its outputs to a caller-chosen number of
//! decimal digits at construction time, so chained compositions stay on a
//! bounded-precision grid and keep passing the unit-norm check.

use crate::{Result, VmcError};
use std::fmt;

/// Digits past which an `f64` has nothing left to round.
const MAX_ROUND_DIGITS: i32 = 15;

/// Round `value` to `precision` digits after the decimal point
/// (ties to even). Precisions beyond what an `f64` resolves return `value`
/// unchanged.
pub(crate) fn round_to(value: f64, precision: u32) -> f64 {
    let digits = match i32::try_from(precision) {
        Ok(digits) if digits <= MAX_ROUND_DIGITS => digits,
        _ => return value,
    };
    let scaled = value * 10f64.powi(digits);
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / 10f64.powi(digits)
}

/// A point in the consumer's coordinate space (usually meters).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin, (0, 0, 0).
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}, {:?}, {:?}", self.x, self.y, self.z)
    }
}

/// A rotation as a unit quaternion (x, y, z, w).
///
/// The squared magnitude, rounded to one decimal digit, must equal 1.0.
/// The loose tolerance admits the floating point error that builds up
/// in upstream trigonometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    x: f64,
    y: f64,
    z: f64,
    w: f64,
}

impl Quaternion {
    /// Validating constructor. Fails with [`VmcError::InvalidQuaternion`]
    /// when the components do not describe a unit quaternion.
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Result<Self> {
        let norm_sq = x.powi(2) + y.powi(2) + z.powi(2) + w.powi(2);
        if round_to(norm_sq, 1) == 1.0 {
            Ok(Self { x, y, z, w })
        } else {
            Err(VmcError::InvalidQuaternion { x, y, z, w })
        }
    }

    /// The identity rotation, (0, 0, 0, 1).
    pub const fn identity() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }

    /// Builds a quaternion from intrinsic X-Y-Z Euler angles in degrees:
    /// `phi` about X, `theta` about Y, `psi` about Z.
    ///
    /// Each component is rounded to `precision` decimal digits.
    ///
    /// ```
    /// use vmc_osc::Quaternion;
    /// let q = Quaternion::from_euler(-90.0, -180.0, 90.0, 12).unwrap();
    /// assert_eq!(q.components(), [0.5, -0.5, -0.5, 0.5]);
    /// ```
    pub fn from_euler(phi: f64, theta: f64, psi: f64, precision: u32) -> Result<Self> {
        // x axis
        let cos_phi_half = (phi.to_radians() / 2.0).cos();
        let sin_phi_half = (phi.to_radians() / 2.0).sin();
        // y axis
        let cos_theta_half = (theta.to_radians() / 2.0).cos();
        let sin_theta_half = (theta.to_radians() / 2.0).sin();
        // z axis
        let cos_psi_half = (psi.to_radians() / 2.0).cos();
        let sin_psi_half = (psi.to_radians() / 2.0).sin();

        Self::new(
            round_to(
                sin_phi_half * cos_theta_half * cos_psi_half
                    - cos_phi_half * sin_theta_half * sin_psi_half,
                precision,
            ),
            round_to(
                cos_phi_half * sin_theta_half * cos_psi_half
                    + sin_phi_half * cos_theta_half * sin_psi_half,
                precision,
            ),
            round_to(
                cos_phi_half * cos_theta_half * sin_psi_half
                    - sin_phi_half * sin_theta_half * cos_psi_half,
                precision,
            ),
            round_to(
                cos_phi_half * cos_theta_half * cos_psi_half
                    + sin_phi_half * sin_theta_half * sin_psi_half,
                precision,
            ),
        )
    }

    /// Builds a quaternion from an axis-angle rotation vector in radians,
    /// the per-joint format emitted by SMPL-style pose estimators.
    /// The vector's length is the angle and its direction the axis.
    pub fn from_rotation_vector(rx: f64, ry: f64, rz: f64, precision: u32) -> Result<Self> {
        let angle = (rx * rx + ry * ry + rz * rz).sqrt();
        if angle < f64::EPSILON {
            return Ok(Self::identity());
        }
        let half = angle / 2.0;
        let scale = half.sin() / angle;
        Self::new(
            round_to(rx * scale, precision),
            round_to(ry * scale, precision),
            round_to(rz * scale, precision),
            round_to(half.cos(), precision),
        )
    }

    /// Converts back to Euler angles in degrees, returned as (x, y, z).
    ///
    /// The Y extraction clamps its `asin` input to [-1, 1]. Near ±90° about
    /// Y the decomposition is degenerate (gimbal lock): the result is a valid
    /// equivalent rotation but not necessarily the angles that built the
    /// quaternion. `from_euler(-90, -180, 90)` comes back as `(90, 0, -90)`.
    pub fn to_euler(&self) -> (f64, f64, f64) {
        let (x, y, z, w) = (self.x, self.y, self.z, self.w);

        let t0 = 2.0 * (w * x + y * z);
        let t1 = 1.0 - 2.0 * (x * x + y * y);
        let roll = t0.atan2(t1);

        let t2 = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0);
        let pitch = t2.asin();

        let t3 = 2.0 * (w * z + x * y);
        let t4 = 1.0 - 2.0 * (y * y + z * z);
        let yaw = t3.atan2(t4);

        (roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
    }

    /// The inverse rotation of a unit quaternion: vector part negated.
    pub fn conjugate(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Hamilton product `self * other`: `other` is applied first, then
    /// `self`. Components are rounded to `precision` digits.
    pub fn multiply_by(&self, other: &Quaternion, precision: u32) -> Result<Self> {
        let (a, b) = (self, other);
        Self::new(
            round_to(a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y, precision),
            round_to(a.w * b.y + a.y * b.w + a.z * b.x - a.x * b.z, precision),
            round_to(a.w * b.z + a.z * b.w + a.x * b.y - a.y * b.x, precision),
            round_to(a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z, precision),
        )
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    /// Components in wire order: x, y, z, w.
    pub fn components(&self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}, {:?}, {:?}, {:?}", self.x, self.y, self.z, self.w)
    }
}
