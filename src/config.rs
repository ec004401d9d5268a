//! JSON configuration documents and their loaders.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::characteristics::Characteristic;
use crate::errors::LoadError;
use crate::simulation::{JackingMotion, TravelSweep};
use crate::vehicle::{AxleEnd, CornerId, Side, Vehicle, VehicleSpec};

/// Which driver a run uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    /// Sweep one corner and report its wheel attitude.
    #[default]
    WheelAttitude,
    /// Sweep both corners of an axle half and report jacking behaviour.
    Jacking,
}

/// Characteristics requested for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacteristicFlags {
    /// Report camber.
    #[serde(default = "enabled")]
    pub camber: bool,
    /// Report caster (front half only).
    #[serde(default = "enabled")]
    pub caster: bool,
    /// Report toe.
    #[serde(default = "enabled")]
    pub toe: bool,
    /// Report kingpin inclination.
    #[serde(default)]
    pub kingpin_inclination: bool,
    /// Report half-shaft plunge.
    #[serde(default)]
    pub axle_plunge: bool,
    /// Report both half-shaft joint angles.
    #[serde(default)]
    pub axle_angles: bool,
    /// Report track change.
    #[serde(default)]
    pub track_change: bool,
    /// Report wheelbase change.
    #[serde(default)]
    pub wheelbase_change: bool,
    /// Keep the solved point sets of every step.
    #[serde(default, alias = "3d")]
    pub three_d: bool,
}

/// Serde default for characteristics plotted unless switched off.
const fn enabled() -> bool {
    true
}

impl Default for CharacteristicFlags {
    fn default() -> Self {
        Self {
            camber: true,
            caster: true,
            toe: true,
            kingpin_inclination: false,
            axle_plunge: false,
            axle_angles: false,
            track_change: false,
            wheelbase_change: false,
            three_d: false,
        }
    }
}

impl CharacteristicFlags {
    /// Requested characteristics in reporting order.
    #[must_use]
    pub fn requested(&self) -> Vec<Characteristic> {
        Characteristic::ALL
            .into_iter()
            .filter(|characteristic| match characteristic {
                Characteristic::Camber => self.camber,
                Characteristic::Caster => self.caster,
                Characteristic::Toe => self.toe,
                Characteristic::KingpinInclination => self.kingpin_inclination,
                Characteristic::AxlePlunge => self.axle_plunge,
                Characteristic::AxleAngleInboard | Characteristic::AxleAngleOutboard => {
                    self.axle_angles
                }
                Characteristic::TrackChange => self.track_change,
                Characteristic::WheelbaseChange => self.wheelbase_change,
            })
            .collect()
    }
}

/// One simulation request.
///
/// # Examples
/// ```
/// use suspx::{config_from_str, AxleEnd, Side, SimulationKind};
///
/// let config = config_from_str(r#"{ "simulation": "wheel_attitude" }"#).expect("valid json");
/// assert_eq!(config.simulation, SimulationKind::WheelAttitude);
/// assert_eq!(config.side, Side::Right);
/// assert_eq!(config.half, AxleEnd::Front);
/// assert!(config.plots.camber && !config.plots.axle_plunge);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Driver to use.
    #[serde(default)]
    pub simulation: SimulationKind,
    /// Side of the swept corner for wheel-attitude runs.
    #[serde(default)]
    pub side: Side,
    /// Axle half to simulate.
    #[serde(default)]
    pub half: AxleEnd,
    /// Travel values to visit.
    #[serde(default)]
    pub travel: TravelSweep,
    /// Relation between left and right travel in jacking runs.
    #[serde(default)]
    pub jacking_motion: JackingMotion,
    /// Characteristics to report.
    #[serde(default)]
    pub plots: CharacteristicFlags,
}

impl SimulationConfig {
    /// Corner swept by a wheel-attitude run.
    #[must_use]
    pub const fn corner(&self) -> CornerId {
        CornerId::new(self.half, self.side)
    }
}

/// Parse a vehicle description and build the vehicle.
///
/// # Errors
///
/// Returns [`LoadError`] for malformed JSON or an invalid vehicle.
pub fn vehicle_from_str(text: &str) -> Result<Vehicle, LoadError> {
    let spec: VehicleSpec = serde_json::from_str(text)?;
    Ok(Vehicle::from_spec(&spec)?)
}

/// Parse a simulation configuration.
///
/// # Errors
///
/// Returns [`LoadError`] for malformed JSON or an invalid travel sweep.
pub fn config_from_str(text: &str) -> Result<SimulationConfig, LoadError> {
    let config: SimulationConfig = serde_json::from_str(text)?;
    config.travel.validate()?;
    Ok(config)
}

/// Read and build a vehicle from a JSON file.
///
/// # Errors
///
/// Returns [`LoadError`] when the file cannot be read or parsed.
pub fn load_vehicle(path: impl AsRef<Path>) -> Result<Vehicle, LoadError> {
    vehicle_from_str(&read(path.as_ref())?)
}

/// Read a simulation configuration from a JSON file.
///
/// # Errors
///
/// Returns [`LoadError`] when the file cannot be read or parsed.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimulationConfig, LoadError> {
    config_from_str(&read(path.as_ref())?)
}

/// Read a configuration file into memory.
fn read(path: &Path) -> Result<String, LoadError> {
    tracing::debug!(path = %path.display(), "reading configuration");
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}
