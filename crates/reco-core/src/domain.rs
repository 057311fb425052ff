//! Domain constants: semantic shapes, particle identities and the lookup
//! tables tying them together.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, RecoError};

/// Electron rest mass in MeV.
pub const ELECTRON_MASS: f64 = 0.510_998_946_1;
/// Muon rest mass in MeV.
pub const MUON_MASS: f64 = 105.658_374_5;
/// Charged pion rest mass in MeV.
pub const PION_MASS: f64 = 139.570_39;
/// Proton rest mass in MeV.
pub const PROTON_MASS: f64 = 938.272_081_3;
/// Charged kaon rest mass in MeV.
pub const KAON_MASS: f64 = 493.677;

/// Coarse voxel-level classification produced by semantic segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Electromagnetic shower.
    Shower,
    /// Minimum-ionizing or heavily ionizing track.
    Track,
    /// Michel electron from a stopping muon decay.
    Michel,
    /// Delta ray knocked off a track.
    Delta,
    /// Low energy depositions.
    LowEnergy,
    /// Ghost points (tomographic artefacts).
    Ghost,
    /// Unclassified.
    Unknown,
}

impl Shape {
    /// Returns the integer label used by the segmentation network.
    pub fn label(&self) -> i32 {
        match self {
            Shape::Shower => 0,
            Shape::Track => 1,
            Shape::Michel => 2,
            Shape::Delta => 3,
            Shape::LowEnergy => 4,
            Shape::Ghost => 5,
            Shape::Unknown => -1,
        }
    }

    /// Maps a network label back to a shape. Unrecognised labels are [`Shape::Unknown`].
    pub fn from_label(label: i32) -> Self {
        match label {
            0 => Shape::Shower,
            1 => Shape::Track,
            2 => Shape::Michel,
            3 => Shape::Delta,
            4 => Shape::LowEnergy,
            5 => Shape::Ghost,
            _ => Shape::Unknown,
        }
    }

    /// Returns the snake_case name of the shape.
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Shower => "shower",
            Shape::Track => "track",
            Shape::Michel => "michel",
            Shape::Delta => "delta",
            Shape::LowEnergy => "low_energy",
            Shape::Ghost => "ghost",
            Shape::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Particle identity classes predicted by the particle-level network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pid {
    /// Photon.
    Photon,
    /// Electron or positron.
    Electron,
    /// Muon.
    Muon,
    /// Charged pion.
    Pion,
    /// Proton.
    Proton,
    /// Charged kaon.
    Kaon,
}

impl Pid {
    /// Every class in label order.
    pub const ALL: [Pid; 6] = [
        Pid::Photon,
        Pid::Electron,
        Pid::Muon,
        Pid::Pion,
        Pid::Proton,
        Pid::Kaon,
    ];

    /// Number of supported classes.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the integer label (index into a PID score vector).
    pub fn label(&self) -> i32 {
        *self as i32
    }

    /// Returns the score vector index of the class.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Maps a label back to a class, if it is one of the supported classes.
    pub fn from_label(label: i32) -> Option<Self> {
        usize::try_from(label)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    /// Short tag used when building topology strings (`1mu1p`).
    pub fn tag(&self) -> &'static str {
        match self {
            Pid::Photon => "g",
            Pid::Electron => "e",
            Pid::Muon => "mu",
            Pid::Pion => "pi",
            Pid::Proton => "p",
            Pid::Kaon => "k",
        }
    }

    /// Returns the snake_case name of the class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Pid::Photon => "photon",
            Pid::Electron => "electron",
            Pid::Muon => "muon",
            Pid::Pion => "pion",
            Pid::Proton => "proton",
            Pid::Kaon => "kaon",
        }
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_track_shape() -> Shape {
    Shape::Track
}

/// Read-only lookup tables shared by every processor.
///
/// Built once at start-up (see [`DomainTables::standard`]) and passed by
/// reference; nothing mutates them while events are processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainTables {
    /// PID classes compatible with each semantic shape.
    pub shape_to_pid: BTreeMap<Shape, Vec<Pid>>,
    /// Primary-status classes (0: secondary, 1: primary) compatible with each shape.
    pub shape_to_primary: BTreeMap<Shape, Vec<usize>>,
    /// Rest mass of each class in MeV.
    pub pid_masses: BTreeMap<Pid, f64>,
    /// Shape that selects track-specific behaviour.
    #[serde(default = "default_track_shape")]
    pub track_shape: Shape,
}

impl Default for DomainTables {
    fn default() -> Self {
        Self::standard()
    }
}

impl DomainTables {
    /// Returns the tables used by the standard reconstruction chain.
    pub fn standard() -> Self {
        let shape_to_pid = BTreeMap::from([
            (Shape::Shower, vec![Pid::Photon, Pid::Electron]),
            (
                Shape::Track,
                vec![Pid::Muon, Pid::Pion, Pid::Proton, Pid::Kaon],
            ),
            (Shape::Michel, vec![Pid::Electron]),
            (Shape::Delta, vec![Pid::Electron]),
        ]);
        let shape_to_primary = BTreeMap::from([
            (Shape::Shower, vec![0, 1]),
            (Shape::Track, vec![0, 1]),
            (Shape::Michel, vec![0]),
            (Shape::Delta, vec![0]),
        ]);
        let pid_masses = BTreeMap::from([
            (Pid::Photon, 0.0),
            (Pid::Electron, ELECTRON_MASS),
            (Pid::Muon, MUON_MASS),
            (Pid::Pion, PION_MASS),
            (Pid::Proton, PROTON_MASS),
            (Pid::Kaon, KAON_MASS),
        ]);
        Self {
            shape_to_pid,
            shape_to_primary,
            pid_masses,
            track_shape: Shape::Track,
        }
    }

    /// Checks that every mass is finite and non-negative.
    pub fn validate(&self) -> Result<(), RecoError> {
        for (pid, mass) in &self.pid_masses {
            if !mass.is_finite() || *mass < 0.0 {
                return Err(RecoError::Config(
                    ErrorInfo::new("invalid-mass", "rest masses must be finite and non-negative")
                        .with_context("pid", pid)
                        .with_context("mass", mass),
                ));
            }
        }
        Ok(())
    }

    /// Whether the shape selects track-specific behaviour.
    pub fn is_track(&self, shape: Shape) -> bool {
        shape == self.track_shape
    }

    /// Score vector indices of the PID classes allowed for `shape`.
    pub fn allowed_pid_indices(&self, shape: Shape) -> Result<Vec<usize>, RecoError> {
        self.shape_to_pid
            .get(&shape)
            .map(|pids| pids.iter().map(Pid::index).collect())
            .ok_or_else(|| unsupported_shape(shape, "shape_to_pid"))
    }

    /// Primary-status indices allowed for `shape`.
    pub fn allowed_primary_indices(&self, shape: Shape) -> Result<&[usize], RecoError> {
        self.shape_to_primary
            .get(&shape)
            .map(Vec::as_slice)
            .ok_or_else(|| unsupported_shape(shape, "shape_to_primary"))
    }

    /// Rest mass for a raw PID label, if the label is a supported class.
    pub fn mass(&self, pid_label: i32) -> Option<f64> {
        Pid::from_label(pid_label).and_then(|pid| self.pid_masses.get(&pid).copied())
    }
}

fn unsupported_shape(shape: Shape, table: &str) -> RecoError {
    RecoError::Domain(
        ErrorInfo::new("unsupported-shape", "no table entry for semantic shape")
            .with_context("shape", shape)
            .with_context("table", table),
    )
}
