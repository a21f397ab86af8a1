//! vmc-osc/src/bone.rs
//!
//! The closed set of VRM humanoid bone names a VMC receiver understands.
//! Bones are pure addressing tokens; they carry no geometry.

use crate::{Result, VmcError};
use std::fmt;
use std::str::FromStr;

macro_rules! humanoid_bones {
    ($($variant:ident),* $(,)?) => {
        /// One of the 55 canonical VRM humanoid bones.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Bone {
            $($variant),*
        }

        impl Bone {
            /// Every bone, in canonical order.
            pub const ALL: [Bone; 55] = [$(Bone::$variant),*];

            /// The canonical name sent on the wire.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Bone::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

humanoid_bones! {
    Hips,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    LeftFoot,
    RightFoot,
    Spine,
    Chest,
    Neck,
    Head,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
    LeftToes,
    RightToes,
    LeftEye,
    RightEye,
    Jaw,
    LeftThumbProximal,
    LeftThumbIntermediate,
    LeftThumbDistal,
    LeftIndexProximal,
    LeftIndexIntermediate,
    LeftIndexDistal,
    LeftMiddleProximal,
    LeftMiddleIntermediate,
    LeftMiddleDistal,
    LeftRingProximal,
    LeftRingIntermediate,
    LeftRingDistal,
    LeftLittleProximal,
    LeftLittleIntermediate,
    LeftLittleDistal,
    RightThumbProximal,
    RightThumbIntermediate,
    RightThumbDistal,
    RightIndexProximal,
    RightIndexIntermediate,
    RightIndexDistal,
    RightMiddleProximal,
    RightMiddleIntermediate,
    RightMiddleDistal,
    RightRingProximal,
    RightRingIntermediate,
    RightRingDistal,
    RightLittleProximal,
    RightLittleIntermediate,
    RightLittleDistal,
    UpperChest,
}

/// VRM bone for each of the 24 SMPL body joints, indexed by joint number.
const SMPL_JOINTS: [Bone; 24] = [
    Bone::Hips,                // pelvis
    Bone::LeftUpperLeg,        // l_hip
    Bone::RightUpperLeg,       // r_hip
    Bone::Spine,               // spine1
    Bone::LeftLowerLeg,        // l_knee
    Bone::RightLowerLeg,       // r_knee
    Bone::Chest,               // spine2
    Bone::LeftFoot,            // l_ankle
    Bone::RightFoot,           // r_ankle
    Bone::UpperChest,          // spine3
    Bone::LeftToes,            // l_foot
    Bone::RightToes,           // r_foot
    Bone::Neck,                // neck
    Bone::LeftShoulder,        // l_collar
    Bone::RightShoulder,       // r_collar
    Bone::Head,                // head
    Bone::LeftUpperArm,        // l_shoulder
    Bone::RightUpperArm,       // r_shoulder
    Bone::LeftLowerArm,        // l_elbow
    Bone::RightLowerArm,       // r_elbow
    Bone::LeftHand,            // l_wrist
    Bone::RightHand,           // r_wrist
    Bone::LeftMiddleProximal,  // l_hand
    Bone::RightMiddleProximal, // r_hand
];

impl Bone {
    /// Looks a bone up by its canonical name.
    pub fn new(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|bone| bone.name() == name)
            .ok_or_else(|| VmcError::InvalidBoneName(name.to_string()))
    }

    /// Maps an SMPL body joint index (0 = pelvis .. 23 = right hand) to the
    /// VRM bone it drives. These are logical bone names, not rig node names.
    pub fn from_smpl_joint(index: usize) -> Result<Self> {
        SMPL_JOINTS
            .get(index)
            .copied()
            .ok_or(VmcError::InvalidSmplJoint(index))
    }
}

impl FromStr for Bone {
    type Err = VmcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Bone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
