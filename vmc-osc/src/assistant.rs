//! vmc-osc/src/assistant.rs
//!
//! Sender side of the VMC protocol. Turns pose data into messages and
//! bundles in the `/VMC/Ext/...` namespace:
//!
//!   /VMC/Ext/Root/Pos  s f f f f f f f        "root", position, rotation
//!   /VMC/Ext/Bone/Pos  s f f f f f f f        bundled, one per bone
//!   /VMC/Ext/Tra/Pos   s f f f f f f f        bundled, one per tracker
//!   /VMC/Ext/OK        i [i i [i]]            loaded, calibration, tracking
//!   /VMC/Ext/T         f                      seconds since session start

use crate::config::VmcConfig;
use crate::geometry::{Position, Quaternion};
use crate::pose::{BoneTransform, PoseSnapshot, TrackerTransform};
use crate::transport::{OscClient, OscTransport};
use crate::{Result, VmcError};
use rosc::OscType;

pub const ROOT_TRANSFORM_ADDR: &str = "/VMC/Ext/Root/Pos";
pub const BONE_TRANSFORM_ADDR: &str = "/VMC/Ext/Bone/Pos";
pub const TRACKER_TRANSFORM_ADDR: &str = "/VMC/Ext/Tra/Pos";
pub const AVAILABLE_STATES_ADDR: &str = "/VMC/Ext/OK";
pub const RELATIVE_TIME_ADDR: &str = "/VMC/Ext/T";

/// Payload of `/VMC/Ext/OK`.
///
/// Receivers negotiate by argument count: older ones read the leading
/// arguments and ignore the rest. Each variant is one wire shape, so fields
/// are only ever appended, never reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailableStates {
    /// `[loaded]`
    Minimal { loaded: i32 },
    /// `[loaded, calibration_state, calibration_mode]` (VMC 2.5)
    WithCalibration {
        loaded: i32,
        calibration_state: i32,
        calibration_mode: i32,
    },
    /// `[loaded, calibration_state, calibration_mode, tracking_status]` (VMC 2.7)
    WithTracking {
        loaded: i32,
        calibration_state: i32,
        calibration_mode: i32,
        tracking_status: i32,
    },
}

impl AvailableStates {
    /// Picks the wire shape from optional fields.
    ///
    /// The calibration pair is all-or-nothing, and a tracking status needs
    /// the full calibration pair. Anything else is
    /// [`VmcError::IncompleteStates`].
    pub fn from_parts(
        loaded: i32,
        calibration_state: Option<i32>,
        calibration_mode: Option<i32>,
        tracking_status: Option<i32>,
    ) -> Result<Self> {
        match (calibration_state, calibration_mode, tracking_status) {
            (None, None, None) => Ok(Self::Minimal { loaded }),
            (Some(calibration_state), Some(calibration_mode), None) => {
                Ok(Self::WithCalibration {
                    loaded,
                    calibration_state,
                    calibration_mode,
                })
            }
            (Some(calibration_state), Some(calibration_mode), Some(tracking_status)) => {
                Ok(Self::WithTracking {
                    loaded,
                    calibration_state,
                    calibration_mode,
                    tracking_status,
                })
            }
            (state, mode, status) => Err(VmcError::IncompleteStates(format!(
                "calibration_state={state:?}, calibration_mode={mode:?}, tracking_status={status:?}"
            ))),
        }
    }

    pub fn to_args(&self) -> Vec<OscType> {
        match *self {
            Self::Minimal { loaded } => vec![OscType::Int(loaded)],
            Self::WithCalibration {
                loaded,
                calibration_state,
                calibration_mode,
            } => vec![
                OscType::Int(loaded),
                OscType::Int(calibration_state),
                OscType::Int(calibration_mode),
            ],
            Self::WithTracking {
                loaded,
                calibration_state,
                calibration_mode,
                tracking_status,
            } => vec![
                OscType::Int(loaded),
                OscType::Int(calibration_state),
                OscType::Int(calibration_mode),
                OscType::Int(tracking_status),
            ],
        }
    }
}

/// `[name, px, py, pz, qx, qy, qz, qw]` with the numbers as OSC floats.
fn transform_args(name: &str, position: &Position, rotation: &Quaternion) -> Vec<OscType> {
    let mut args = Vec::with_capacity(8);
    args.push(OscType::String(name.to_string()));
    args.extend(
        [position.x, position.y, position.z]
            .into_iter()
            .chain(rotation.components())
            .map(|v| OscType::Float(v as f32)),
    );
    args
}

/// VMC sender over an [`OscTransport`].
///
/// Every `send_*` call is synchronous and fire-and-forget. The assistant
/// owns its transport; share it across threads only behind a lock.
pub struct Assistant<T: OscTransport = OscClient> {
    transport: T,
}

impl Assistant<OscClient> {
    /// Opens a UDP client named `name` towards `host:port`.
    pub fn open(host: &str, port: u16, name: &str) -> Result<Self> {
        Ok(Self::with_transport(OscClient::open(host, port, name)?))
    }

    pub fn from_config(config: &VmcConfig) -> Result<Self> {
        Self::open(&config.host, config.port, &config.name)
    }
}

impl<T: OscTransport> Assistant<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Since VMC 2.0.
    pub fn send_root_transform(
        &mut self,
        position: &Position,
        rotation: &Quaternion,
    ) -> Result<()> {
        self.transport
            .send(ROOT_TRANSFORM_ADDR, transform_args("root", position, rotation))
    }

    /// One bundle, one message per bone.
    pub fn send_bones_transform(&mut self, bones: &[BoneTransform]) -> Result<()> {
        let items = bones
            .iter()
            .map(|t| transform_args(t.bone.name(), &t.position, &t.rotation))
            .collect();
        self.transport.send_bundle(BONE_TRANSFORM_ADDR, items)
    }

    /// One bundle, one message per tracker.
    pub fn send_tracker_transform(&mut self, trackers: &[TrackerTransform]) -> Result<()> {
        let items = trackers
            .iter()
            .map(|t| transform_args(&t.name, &t.position, &t.rotation))
            .collect();
        self.transport.send_bundle(TRACKER_TRANSFORM_ADDR, items)
    }

    pub fn send_available_states(&mut self, states: AvailableStates) -> Result<()> {
        self.transport.send(AVAILABLE_STATES_ADDR, states.to_args())
    }

    /// `delta` is seconds since the session epoch; see [`crate::Timestamp`].
    /// Monotonicity is the caller's business.
    pub fn send_relative_time(&mut self, delta: f64) -> Result<()> {
        self.transport
            .send(RELATIVE_TIME_ADDR, vec![OscType::Float(delta as f32)])
    }

    /// Root message followed by the bone bundle.
    pub fn send_snapshot(&mut self, snapshot: &PoseSnapshot) -> Result<()> {
        self.send_root_transform(&snapshot.root.position, &snapshot.root.rotation)?;
        self.send_bones_transform(&snapshot.bones)
    }

    /// Releases the transport.
    pub fn close(mut self) -> Result<()> {
        self.transport.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bone::Bone;
    use std::cell::Cell;
    use std::io;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Message(String, Vec<OscType>),
        Bundle(String, Vec<Vec<OscType>>),
    }

    #[derive(Default)]
    struct RecordingTransport {
        sent: Vec<Sent>,
        closes: Rc<Cell<usize>>,
    }

    impl OscTransport for RecordingTransport {
        fn send(&mut self, address: &str, args: Vec<OscType>) -> Result<()> {
            self.sent.push(Sent::Message(address.to_string(), args));
            Ok(())
        }

        fn send_bundle(&mut self, address: &str, items: Vec<Vec<OscType>>) -> Result<()> {
            self.sent.push(Sent::Bundle(address.to_string(), items));
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            self.closes.set(self.closes.get() + 1);
            Ok(())
        }
    }

    struct FailingTransport;

    fn refused() -> VmcError {
        VmcError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "receiver gone"))
    }

    impl OscTransport for FailingTransport {
        fn send(&mut self, _: &str, _: Vec<OscType>) -> Result<()> {
            Err(refused())
        }

        fn send_bundle(&mut self, _: &str, _: Vec<Vec<OscType>>) -> Result<()> {
            Err(refused())
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn assistant() -> Assistant<RecordingTransport> {
        Assistant::with_transport(RecordingTransport::default())
    }

    fn ints(values: &[i32]) -> Vec<OscType> {
        values.iter().map(|&v| OscType::Int(v)).collect()
    }

    #[test]
    fn test_root_transform() {
        let mut vmc = assistant();
        let rotation = Quaternion::new(0.5, -0.5, -0.5, 0.5).unwrap();
        vmc.send_root_transform(&Position::new(1.0, 2.0, 3.0), &rotation)
            .unwrap();

        assert_eq!(
            vmc.transport().sent,
            vec![Sent::Message(
                ROOT_TRANSFORM_ADDR.to_string(),
                vec![
                    OscType::String("root".into()),
                    OscType::Float(1.0),
                    OscType::Float(2.0),
                    OscType::Float(3.0),
                    OscType::Float(0.5),
                    OscType::Float(-0.5),
                    OscType::Float(-0.5),
                    OscType::Float(0.5),
                ],
            )]
        );
    }

    #[test]
    fn test_available_states_arity() {
        let mut vmc = assistant();
        vmc.send_available_states(AvailableStates::Minimal { loaded: 1 })
            .unwrap();
        vmc.send_available_states(AvailableStates::from_parts(1, Some(0), Some(0), None).unwrap())
            .unwrap();
        vmc.send_available_states(
            AvailableStates::from_parts(1, Some(0), Some(0), Some(2)).unwrap(),
        )
        .unwrap();

        let addr = AVAILABLE_STATES_ADDR.to_string();
        assert_eq!(
            vmc.transport().sent,
            vec![
                Sent::Message(addr.clone(), ints(&[1])),
                Sent::Message(addr.clone(), ints(&[1, 0, 0])),
                Sent::Message(addr, ints(&[1, 0, 0, 2])),
            ]
        );
    }

    #[test]
    fn test_available_states_incomplete_combinations() {
        for (state, mode, status) in [
            (Some(0), None, None),
            (None, Some(0), None),
            (None, None, Some(1)),
            (Some(0), None, Some(1)),
            (None, Some(0), Some(1)),
        ] {
            assert!(
                matches!(
                    AvailableStates::from_parts(1, state, mode, status),
                    Err(VmcError::IncompleteStates(_))
                ),
                "({state:?}, {mode:?}, {status:?}) should be rejected"
            );
        }
        assert_eq!(
            AvailableStates::from_parts(0, None, None, None).unwrap(),
            AvailableStates::Minimal { loaded: 0 }
        );
    }

    #[test]
    fn test_bones_bundle_shape() {
        let mut vmc = assistant();
        let snapshot = PoseSnapshot::t_pose();
        vmc.send_bones_transform(&snapshot.bones).unwrap();

        let [Sent::Bundle(addr, items)] = vmc.transport().sent.as_slice() else {
            panic!("expected exactly one bundle, got {:?}", vmc.transport().sent);
        };
        assert_eq!(addr, BONE_TRANSFORM_ADDR);
        assert_eq!(items.len(), Bone::ALL.len());
        for (args, bone) in items.iter().zip(Bone::ALL) {
            assert_eq!(args.len(), 8);
            assert_eq!(args[0], OscType::String(bone.name().to_string()));
            assert!(args[1..].iter().all(|a| matches!(a, OscType::Float(_))));
            assert_eq!(args[7], OscType::Float(1.0));
        }
    }

    #[test]
    fn test_empty_bundle_still_sent() {
        let mut vmc = assistant();
        vmc.send_bones_transform(&[]).unwrap();
        assert_eq!(
            vmc.transport().sent,
            vec![Sent::Bundle(BONE_TRANSFORM_ADDR.to_string(), vec![])]
        );
    }

    #[test]
    fn test_tracker_transform() {
        let mut vmc = assistant();
        let trackers = vec![
            TrackerTransform::new(
                "LeftFootTracker",
                Position::new(0.1, 0.0, 0.0),
                Quaternion::identity(),
            ),
            TrackerTransform::new("Waist", Position::identity(), Quaternion::identity()),
        ];
        vmc.send_tracker_transform(&trackers).unwrap();

        let [Sent::Bundle(addr, items)] = vmc.transport().sent.as_slice() else {
            panic!("expected exactly one bundle");
        };
        assert_eq!(addr, TRACKER_TRANSFORM_ADDR);
        assert_eq!(items[0][0], OscType::String("LeftFootTracker".into()));
        assert_eq!(items[0][1], OscType::Float(0.1));
        assert_eq!(items[1][0], OscType::String("Waist".into()));
    }

    #[test]
    fn test_relative_time() {
        let mut vmc = assistant();
        vmc.send_relative_time(12.25).unwrap();
        assert_eq!(
            vmc.transport().sent,
            vec![Sent::Message(
                RELATIVE_TIME_ADDR.to_string(),
                vec![OscType::Float(12.25)]
            )]
        );
    }

    #[test]
    fn test_snapshot_sends_root_then_bones() {
        let mut vmc = assistant();
        let mut snapshot = PoseSnapshot::default();
        snapshot.push(Bone::Hips, Position::identity(), Quaternion::identity());
        vmc.send_snapshot(&snapshot).unwrap();

        let sent = &vmc.transport().sent;
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], Sent::Message(addr, _) if addr == ROOT_TRANSFORM_ADDR));
        assert!(matches!(
            &sent[1],
            Sent::Bundle(addr, items) if addr == BONE_TRANSFORM_ADDR && items.len() == 1
        ));
    }

    #[test]
    fn test_transport_errors_propagate() {
        let mut vmc = Assistant::with_transport(FailingTransport);
        assert!(matches!(vmc.send_relative_time(0.0), Err(VmcError::Io(_))));
        assert!(matches!(
            vmc.send_bones_transform(&PoseSnapshot::t_pose().bones),
            Err(VmcError::Io(_))
        ));
        assert!(matches!(
            vmc.send_snapshot(&PoseSnapshot::t_pose()),
            Err(VmcError::Io(_))
        ));
    }

    #[test]
    fn test_transport_errors_keep_io_kind() {
        let mut vmc = Assistant::with_transport(FailingTransport);
        let err = vmc.send_root_transform(&Position::identity(), &Quaternion::identity());
        match err {
            Err(VmcError::Io(e)) => {
                assert_eq!(e.kind(), io::ErrorKind::ConnectionRefused);
                assert_eq!(e.to_string(), "receiver gone");
            }
            other => panic!("expected Io, got {other:?}"),
        }

        let err = vmc.send_tracker_transform(&[]).unwrap_err();
        let source = std::error::Error::source(&err).expect("Io should expose its source");
        assert_eq!(source.to_string(), "receiver gone");
    }

    #[test]
    fn test_close_releases_transport_once() {
        let transport = RecordingTransport::default();
        let closes = transport.closes.clone();
        let vmc = Assistant::with_transport(transport);
        assert_eq!(closes.get(), 0);

        vmc.close().unwrap();
        assert_eq!(closes.get(), 1);
    }
}
