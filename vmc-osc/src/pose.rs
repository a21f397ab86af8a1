//! vmc-osc/src/pose.rs
//!
//! One frame of performer pose: the avatar root plus per-bone transforms.

use crate::bone::Bone;
use crate::geometry::{Position, Quaternion};
use crate::Result;

/// The avatar's world-space placement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootTransform {
    pub position: Position,
    pub rotation: Quaternion,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    pub bone: Bone,
    pub position: Position,
    pub rotation: Quaternion,
}

/// A generic tracker point, named freely by the sender.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerTransform {
    pub name: String,
    pub position: Position,
    pub rotation: Quaternion,
}

impl TrackerTransform {
    pub fn new(name: impl Into<String>, position: Position, rotation: Quaternion) -> Self {
        Self {
            name: name.into(),
            position,
            rotation,
        }
    }
}

/// Root transform plus bone transforms for a single frame.
///
/// Order does not matter on the wire since each bone message names its bone.
/// Duplicate bones are not rejected here; sending each bone at most once per
/// frame is up to the caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoseSnapshot {
    pub root: RootTransform,
    pub bones: Vec<BoneTransform>,
}

impl PoseSnapshot {
    pub fn new(root: RootTransform) -> Self {
        Self {
            root,
            bones: Vec::new(),
        }
    }

    pub fn push(&mut self, bone: Bone, position: Position, rotation: Quaternion) {
        self.bones.push(BoneTransform {
            bone,
            position,
            rotation,
        });
    }

    /// Every bone at the origin with the identity rotation.
    pub fn t_pose() -> Self {
        let mut snapshot = Self::default();
        for bone in Bone::ALL {
            snapshot.push(bone, Position::identity(), Quaternion::identity());
        }
        snapshot
    }

    /// Builds a snapshot from SMPL joint rotations (axis-angle vectors, one
    /// per joint, in SMPL joint order). The root is oriented by the hips
    /// rotation composed with a +90° turn about Y, which faces the SMPL
    /// body forward in VMC space. At most 24 joints are read; extra entries
    /// fail with [`crate::VmcError::InvalidSmplJoint`].
    pub fn from_smpl_rotations(
        root_position: Position,
        rotations: &[[f64; 3]],
        precision: u32,
    ) -> Result<Self> {
        let mut snapshot = Self::new(RootTransform {
            position: root_position,
            rotation: Quaternion::identity(),
        });
        for (index, [rx, ry, rz]) in rotations.iter().copied().enumerate() {
            let bone = Bone::from_smpl_joint(index)?;
            let rotation = Quaternion::from_rotation_vector(rx, ry, rz, precision)?;
            if bone == Bone::Hips {
                let facing = Quaternion::from_euler(0.0, 90.0, 0.0, precision)?;
                snapshot.root.rotation = rotation.multiply_by(&facing, precision)?;
            }
            snapshot.push(bone, Position::identity(), rotation);
        }
        Ok(snapshot)
    }
}
