use clap::ValueEnum;
use mines3d_protocol::{Rotation, Settings};
use std::f64::consts::PI;

/// Rotation applied per step, 3.75 degrees.
pub(crate) const ROTATION_STEP: f64 = PI / 48.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Board orientation being tuned in one dev session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RotationTuner {
    settings: Settings,
}

impl RotationTuner {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn rotate(&mut self, axis: Axis, steps: i32) -> Rotation {
        self.settings.board_rotation[axis.index()] += ROTATION_STEP * f64::from(steps);
        self.settings.board_rotation
    }

    pub fn reset(&mut self) {
        self.settings.board_rotation = Rotation::default();
    }
}
