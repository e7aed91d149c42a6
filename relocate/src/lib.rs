pub mod bitmask_flags;
pub mod constants;
pub mod constraints;
pub mod error;
pub mod rapier_world;
pub mod report;
pub mod sequencer;
pub mod simulation;
pub mod strategy;
pub mod trial;
pub mod trigger;

pub use constants::{
    BODY_RADIUS, FIXED_STEP, FIXED_STEP_SECONDS, INTERPOLATION_RESIDUAL_EPS, REPORT_PRECISION,
    SCENE_GRAVITY_Y, TARGET_RADIUS,
};
pub use constraints::{Constraints, LockedAxis};
pub use error::{ConfigError, ConfigResult};
pub use rapier_world::{BodyDef, ColliderShapeDef, ObstacleDef, RapierSimulation, WorldSettings};
pub use report::{Accuracy, ErrorReport};
pub use sequencer::{Phase, RelocationReport, SequencerConfig, TickSequencer};
pub use simulation::{BodyFlags, Simulation, Vec2};
pub use strategy::{RelocationStrategy, Scratch, StrategyKind};
pub use trial::{TrialOutcome, TrialScene, compare_all, run_trial};
pub use trigger::TargetTrigger;
