//! Built-in starter catalog.
//!
//! Installed into an empty store on first launch so the app is usable
//! before any custom content exists. Bundled defaults never overwrite user
//! data; seeding is a plain import against an empty catalog.

use cadence_types::{Exercise, ImportPayload, Intensity, ProgramRecord, ProgramStep, Zone};
use chrono::Utc;

fn exercise(
    id: &str,
    name: &str,
    description: &str,
    tags: &[&str],
    zone: Zone,
    intensity: Intensity,
    default_duration: u32,
    side_switch: bool,
) -> Exercise {
    let now = Utc::now();
    Exercise {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        zone,
        intensity,
        default_duration,
        media: None,
        side_switch,
        created_at: Some(now),
        updated_at: Some(now),
    }
}

pub fn seed_exercises() -> Vec<Exercise> {
    vec![
        exercise(
            "jumping-jacks",
            "Jumping jacks",
            "Jump while spreading arms and legs, then back together.",
            &["warmup", "cardio"],
            Zone::Full,
            Intensity::Medium,
            45,
            false,
        ),
        exercise(
            "squats",
            "Squats",
            "Feet shoulder-width apart, sit back until thighs are parallel.",
            &["strength"],
            Zone::Legs,
            Intensity::Medium,
            40,
            false,
        ),
        exercise(
            "push-ups",
            "Push-ups",
            "Keep the body straight and lower the chest to the floor.",
            &["strength"],
            Zone::Arms,
            Intensity::High,
            30,
            false,
        ),
        exercise(
            "plank",
            "Plank",
            "Hold a straight line from head to heels on your forearms.",
            &["isometric"],
            Zone::Core,
            Intensity::High,
            60,
            false,
        ),
        exercise(
            "side-lunges",
            "Side lunges",
            "Step wide to one side and bend that knee, keeping the other leg straight.",
            &["strength", "balance"],
            Zone::Legs,
            Intensity::Medium,
            40,
            true,
        ),
        exercise(
            "single-leg-balance",
            "Single-leg balance",
            "Stand on one leg with a soft knee and steady hips.",
            &["balance"],
            Zone::Legs,
            Intensity::Low,
            30,
            true,
        ),
        exercise(
            "shoulder-rolls",
            "Shoulder rolls",
            "Roll the shoulders slowly backwards in full circles.",
            &["warmup", "mobility"],
            Zone::Arms,
            Intensity::Low,
            30,
            false,
        ),
        exercise(
            "mountain-climbers",
            "Mountain climbers",
            "From a high plank, drive the knees towards the chest in turn.",
            &["cardio"],
            Zone::Full,
            Intensity::High,
            30,
            false,
        ),
    ]
}

pub fn seed_programs() -> Vec<ProgramRecord> {
    let now = Utc::now();
    let steps = [
        ("jumping-jacks", 45),
        ("squats", 40),
        ("side-lunges", 40),
        ("push-ups", 30),
        ("plank", 60),
        ("mountain-climbers", 30),
        ("single-leg-balance", 30),
        ("shoulder-rolls", 30),
    ];
    vec![ProgramRecord {
        id: "morning-circuit".to_string(),
        name: "Morning circuit".to_string(),
        steps: steps
            .iter()
            .enumerate()
            .map(|(i, (exercise_id, duration))| ProgramStep {
                id: format!("morning-circuit-{i}"),
                exercise_id: exercise_id.to_string(),
                duration: *duration,
            })
            .collect(),
        music_url: None,
        notes: Some("A balanced starter round touching every zone.".to_string()),
        created_at: now,
        updated_at: now,
    }]
}

/// The full first-launch payload. Sessions are deliberately absent.
pub fn seed_payload() -> ImportPayload {
    ImportPayload {
        exercises: Some(seed_exercises()),
        programs: Some(seed_programs()),
        sessions: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_programs_resolve_against_seed_exercises() {
        let exercises = seed_exercises();
        for program in seed_programs() {
            for step in &program.steps {
                assert!(
                    exercises.iter().any(|e| e.id == step.exercise_id),
                    "unresolved seed step {}",
                    step.exercise_id
                );
                assert!(step.duration > 0);
            }
        }
    }

    #[test]
    fn seed_includes_a_side_switch_exercise() {
        assert!(seed_exercises().iter().any(|e| e.side_switch));
    }
}
