#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod characteristics;
mod config;
mod errors;
mod geometry;
mod hardpoints;
mod linkage;
mod runner;
pub mod simulation;
mod solver;
mod step;
mod vehicle;

pub use characteristics::Characteristic;
pub use config::{
    config_from_str, load_config, load_vehicle, vehicle_from_str, CharacteristicFlags,
    SimulationConfig, SimulationKind,
};
pub use errors::{CharacteristicError, ConfigurationError, GeometryError, LoadError};
pub use geometry::{point, Axis, Line2, Point, TOLERANCE};
pub use hardpoints::{
    DoubleAArm, Hardpoint, HardpointSet, SemiTrailingLink, Topology, TopologyKind,
};
pub use linkage::{Link, Linkage};
pub use runner::{run_simulation, CornerReport, GapReport, Omission, Series, SimulationReport};
pub use simulation::{
    FrontViewPoint, Gap, JackingMotion, JackingResult, JackingSample, JackingSimulation,
    SweepResult, TravelSweep, WheelAttitudeSimulation,
};
pub use solver::{Pose, SolveHint};
pub use step::Step;
pub use vehicle::{AxleEnd, Corner, CornerId, CornerSpec, Side, Vehicle, VehicleSpec};
