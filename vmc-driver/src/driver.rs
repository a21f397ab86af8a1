//! vmc-driver/src/driver.rs
//!
//! Produces one frame of test pose per tick and pushes it through the
//! assistant: availability state, transforms, then the relative time.

use std::str::FromStr;
use tracing::debug;

use vmc_osc::timestamp::DEFAULT_PRECISION;
use vmc_osc::{
    Assistant, AvailableStates, Bone, OscClient, OscTransport, PoseSnapshot, Position,
    Quaternion, Timestamp, VmcConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Root plus every bone at rest.
    TPose,
    /// LeftUpperLeg swinging about Z, -180..180 degrees in 1 degree steps.
    Sweep,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tpose" => Ok(Mode::TPose),
            "sweep" => Ok(Mode::Sweep),
            other => Err(anyhow::anyhow!(
                "Invalid mode '{other}'. Use --mode=tpose or --mode=sweep."
            )),
        }
    }
}

/// Sweep angle in degrees for a given frame.
pub fn sweep_angle(frame: u64) -> f64 {
    -180.0 + (frame % 361) as f64
}

pub struct PoseDriver<T: OscTransport = OscClient> {
    vmc: Assistant<T>,
    mode: Mode,
    started: Timestamp,
    delta_offset: f64,
    precision: u32,
    t_pose: PoseSnapshot,
    frames_sent: u64,
}

impl<T: OscTransport> PoseDriver<T> {
    pub fn new(vmc: Assistant<T>, mode: Mode, cfg: &VmcConfig) -> Self {
        Self {
            vmc,
            mode,
            started: Timestamp::now(),
            delta_offset: cfg.delta_offset,
            precision: cfg.precision,
            t_pose: PoseSnapshot::t_pose(),
            frames_sent: 0,
        }
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    pub fn assistant_mut(&mut self) -> &mut Assistant<T> {
        &mut self.vmc
    }

    /// Sends one frame.
    pub fn step(&mut self) -> vmc_osc::Result<()> {
        let loaded = AvailableStates::Minimal { loaded: 1 };
        match self.mode {
            Mode::TPose => {
                self.vmc.send_available_states(loaded)?;
                self.vmc.send_snapshot(&self.t_pose)?;
            }
            Mode::Sweep => {
                let angle = sweep_angle(self.frames_sent);
                let mut frame = PoseSnapshot::default();
                frame.push(
                    Bone::LeftUpperLeg,
                    Position::identity(),
                    Quaternion::from_euler(0.0, 0.0, angle, self.precision)?,
                );
                self.vmc.send_bones_transform(&frame.bones)?;
                self.vmc.send_available_states(loaded)?;
                debug!("Sweep frame {} => LeftUpperLeg z={angle}", self.frames_sent);
            }
        }

        let delta = self.started.delta(self.delta_offset, DEFAULT_PRECISION);
        self.vmc.send_relative_time(delta)?;
        self.frames_sent += 1;
        Ok(())
    }

    pub fn close(self) -> vmc_osc::Result<()> {
        self.vmc.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmc_osc::assistant::{
        AVAILABLE_STATES_ADDR, BONE_TRANSFORM_ADDR, RELATIVE_TIME_ADDR, ROOT_TRANSFORM_ADDR,
    };
    use vmc_osc::rosc::OscType;

    /// Records (address, argument or message count) per call.
    #[derive(Default)]
    struct Counter {
        calls: Vec<(String, usize)>,
    }

    impl OscTransport for Counter {
        fn send(&mut self, address: &str, args: Vec<OscType>) -> vmc_osc::Result<()> {
            self.calls.push((address.to_string(), args.len()));
            Ok(())
        }

        fn send_bundle(&mut self, address: &str, items: Vec<Vec<OscType>>) -> vmc_osc::Result<()> {
            self.calls.push((address.to_string(), items.len()));
            Ok(())
        }

        fn close(&mut self) -> vmc_osc::Result<()> {
            Ok(())
        }
    }

    fn driver(mode: Mode) -> PoseDriver<Counter> {
        PoseDriver::new(Assistant::with_transport(Counter::default()), mode, &VmcConfig::default())
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("tpose".parse::<Mode>().unwrap(), Mode::TPose);
        assert_eq!("sweep".parse::<Mode>().unwrap(), Mode::Sweep);
        assert!("dance".parse::<Mode>().is_err());
    }

    #[test]
    fn test_sweep_angle_wraps() {
        assert_eq!(sweep_angle(0), -180.0);
        assert_eq!(sweep_angle(180), 0.0);
        assert_eq!(sweep_angle(360), 180.0);
        assert_eq!(sweep_angle(361), -180.0);
    }

    #[test]
    fn test_tpose_frame() {
        let mut d = driver(Mode::TPose);
        d.step().unwrap();
        assert_eq!(d.frames_sent(), 1);
        assert_eq!(
            d.assistant_mut().transport().calls,
            vec![
                (AVAILABLE_STATES_ADDR.to_string(), 1),
                (ROOT_TRANSFORM_ADDR.to_string(), 8),
                (BONE_TRANSFORM_ADDR.to_string(), 55),
                (RELATIVE_TIME_ADDR.to_string(), 1),
            ]
        );
        d.close().unwrap();
    }

    #[test]
    fn test_sweep_frames() {
        let mut d = driver(Mode::Sweep);
        for _ in 0..3 {
            d.step().unwrap();
        }
        assert_eq!(d.frames_sent(), 3);
        let calls = &d.assistant_mut().transport().calls;
        assert_eq!(calls.len(), 9);
        assert_eq!(calls[0], (BONE_TRANSFORM_ADDR.to_string(), 1));
        assert_eq!(calls[1], (AVAILABLE_STATES_ADDR.to_string(), 1));
        assert_eq!(calls[2], (RELATIVE_TIME_ADDR.to_string(), 1));
    }
}
