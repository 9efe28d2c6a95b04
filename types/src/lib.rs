//! Shared domain types for cadence
//!
//! Serializable records exchanged between the run engine (cadence-core),
//! the CLI, and the on-disk catalog. Wire names are camelCase so catalogs
//! exported by earlier builds keep importing cleanly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Exercises
// ─────────────────────────────────────────────────────────────────────────────

/// Body zone an exercise primarily works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Legs,
    Arms,
    Core,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

/// One catalog exercise. Immutable during a run; owned by the data store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub zone: Zone,
    pub intensity: Intensity,
    /// Seconds; step durations default to this in the builder.
    pub default_duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    /// Whether the exercise works one side of the body at a time and wants
    /// a mid-step switch cue.
    #[serde(default)]
    pub side_switch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Programs
// ─────────────────────────────────────────────────────────────────────────────

/// One timed occurrence of an exercise inside a program. Position in the
/// program's step vector is execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramStep {
    pub id: String,
    pub exercise_id: String,
    /// Seconds, always > 0.
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRecord {
    pub id: String,
    pub name: String,
    pub steps: Vec<ProgramStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgramRecord {
    /// Sum of all step durations in seconds.
    pub fn total_seconds(&self) -> u32 {
        self.steps.iter().map(|step| step.duration).sum()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────────────────────────────────────

/// Summary row written once per completed run, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub program_id: String,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: u32,
    pub interrupt_count: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog transfer
// ─────────────────────────────────────────────────────────────────────────────

/// Full catalog dump produced by an export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub exercises: Vec<Exercise>,
    pub programs: Vec<ProgramRecord>,
    pub sessions: Vec<SessionRecord>,
}

/// Import payload. Each collection that is present REPLACES the stored
/// collection wholesale; absent collections are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<Exercise>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub programs: Option<Vec<ProgramRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<SessionRecord>>,
}

impl From<CatalogSnapshot> for ImportPayload {
    fn from(snapshot: CatalogSnapshot) -> Self {
        Self {
            exercises: Some(snapshot.exercises),
            programs: Some(snapshot.programs),
            sessions: Some(snapshot.sessions),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Audio settings
// ─────────────────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_volume() -> f32 {
    0.5
}

/// User audio preferences, persisted with the app configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Speak step instructions at step start.
    #[serde(default = "default_true")]
    pub narration_enabled: bool,
    /// Stored 0..1 music level; muting does not overwrite it.
    #[serde(default = "default_volume")]
    pub music_volume: f32,
    #[serde(default)]
    pub music_muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            narration_enabled: true,
            music_volume: default_volume(),
            music_muted: false,
        }
    }
}
