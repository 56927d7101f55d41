//! Geometric configurations consumed by the motion planners.

use serde::{Deserialize, Serialize};

/// A configuration in one of the supported state spaces.
///
/// The scheduler and search treat configurations opaquely; only the
/// lower-bound helper needs a metric embedding, which
/// [`projection`](Self::projection) provides where one exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Configuration {
    /// SE(2) state `(x, y, yaw)`.
    Se2 {
        x: f64,
        y: f64,
        #[serde(default)]
        yaw: f64,
    },
    /// SE(3) state: position plus unit quaternion.
    Se3 {
        x: f64,
        y: f64,
        z: f64,
        qx: f64,
        qy: f64,
        qz: f64,
        qw: f64,
    },
    /// Cell in an occupancy grid.
    Grid { x: i64, y: i64 },
    /// Node in a roadmap graph. Carries no metric embedding.
    Node { id: u64 },
}

impl Configuration {
    /// Convenience constructor for a planar state with zero yaw.
    pub const fn se2(x: f64, y: f64) -> Self {
        Configuration::Se2 { x, y, yaw: 0.0 }
    }

    /// Projects the configuration into workspace coordinates.
    ///
    /// Returns `None` for configurations without a metric embedding
    /// (roadmap nodes); callers must then fall back to a trivial bound.
    pub fn projection(&self) -> Option<[f64; 3]> {
        match *self {
            Configuration::Se2 { x, y, .. } => Some([x, y, 0.0]),
            Configuration::Se3 { x, y, z, .. } => Some([x, y, z]),
            Configuration::Grid { x, y } => Some([x as f64, y as f64, 0.0]),
            Configuration::Node { .. } => None,
        }
    }

    /// Straight-line workspace distance between two configurations.
    ///
    /// `None` when either side has no metric embedding.
    pub fn euclidean_distance(&self, other: &Configuration) -> Option<f64> {
        let a = self.projection()?;
        let b = other.projection()?;
        let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        Some((d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt())
    }

    /// Bit-exact identity key for memoisation.
    pub fn key(&self) -> ConfigurationKey {
        let mut payload = [0u64; 7];
        let kind = match *self {
            Configuration::Se2 { x, y, yaw } => {
                payload[0] = x.to_bits();
                payload[1] = y.to_bits();
                payload[2] = yaw.to_bits();
                0
            }
            Configuration::Se3 {
                x,
                y,
                z,
                qx,
                qy,
                qz,
                qw,
            } => {
                for (slot, value) in payload.iter_mut().zip([x, y, z, qx, qy, qz, qw]) {
                    *slot = value.to_bits();
                }
                1
            }
            Configuration::Grid { x, y } => {
                payload[0] = x as u64;
                payload[1] = y as u64;
                2
            }
            Configuration::Node { id } => {
                payload[0] = id;
                3
            }
        };
        ConfigurationKey { kind, payload }
    }
}

/// Hashable identity of a [`Configuration`].
///
/// Floating-point payloads are compared by their IEEE-754 bit patterns, so
/// two keys are equal exactly when the configurations were built from the
/// same numbers. NaN never occurs in valid inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigurationKey {
    kind: u8,
    payload: [u64; 7],
}
