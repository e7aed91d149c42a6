//! Post-settle error measurement.

use std::fmt;

use crate::{constants::REPORT_PRECISION, simulation::Vec2};

/// Whether a relocation landed exactly on its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accuracy {
    /// Distance is exactly `0.0`.
    Exact,
    /// Any positive distance, however small.
    Approximate,
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Accuracy::Exact => "exact",
            Accuracy::Approximate => "approximate",
        })
    }
}

/// Positional error between a body and its target after settling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorReport {
    pub position: Vec2,
    pub target: Vec2,
    pub distance: f32,
    pub accuracy: Accuracy,
}

impl ErrorReport {
    pub fn measure(position: Vec2, target: Vec2) -> Self {
        let distance = (target - position).norm();
        let accuracy = if distance == 0.0 {
            Accuracy::Exact
        } else {
            Accuracy::Approximate
        };
        Self {
            position,
            target,
            distance,
            accuracy,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.accuracy == Accuracy::Exact
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = REPORT_PRECISION;
        write!(
            f,
            "{}: body ({:.p$}, {:.p$}) target ({:.p$}, {:.p$}) distance {:.p$}",
            self.accuracy,
            self.position.x,
            self.position.y,
            self.target.x,
            self.target.y,
            self.distance,
        )
    }
}

/// Measure the error between `position` and `target` and log it.
pub fn report(position: Vec2, target: Vec2) -> ErrorReport {
    let report = ErrorReport::measure(position, target);
    log::info!(target: "relocate::report", "{report}");
    report
}
