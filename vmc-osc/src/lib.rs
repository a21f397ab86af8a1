//! vmc-osc/src/lib.rs
//!
//! The main library file for the `vmc-osc` crate.
//! Streams a performer's pose to a VMC (Virtual Motion Capture) receiver
//! as OSC messages and bundles over UDP.
//! Re-exports major submodules.

pub mod assistant;
pub mod bone;
pub mod config;
pub mod geometry;
pub mod pose;
pub mod timestamp;
pub mod transport;

use thiserror::Error;

pub use rosc;

pub use assistant::{Assistant, AvailableStates};
pub use bone::Bone;
pub use config::VmcConfig;
pub use geometry::{Position, Quaternion};
pub use pose::{BoneTransform, PoseSnapshot, RootTransform, TrackerTransform};
pub use timestamp::Timestamp;
pub use transport::{OscClient, OscTransport};

#[derive(Error, Debug)]
pub enum VmcError {
    #[error("Invalid quaternion values: x={x}, y={y}, z={z}, w={w}")]
    InvalidQuaternion { x: f64, y: f64, z: f64, w: f64 },

    #[error("Invalid bone name: {0}")]
    InvalidBoneName(String),

    #[error("No VRM bone for SMPL joint index {0}")]
    InvalidSmplJoint(usize),

    #[error("Incomplete availability states: {0}")]
    IncompleteStates(String),

    #[error("Host '{host}:{port}' unavailable: {source}")]
    HostUnreachable {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("OSC encode error: {0}")]
    Encode(String),

    #[error("OSC I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OSC timetag error: {0}")]
    Timetag(String),

    #[error("OSC client '{0}' is already closed")]
    ClientClosed(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VmcError>;
