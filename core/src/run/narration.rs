//! Spoken instruction assembly.

use cadence_types::Exercise;

/// Phrase templates for spoken output. Injected by the caller so the engine
/// stays language-agnostic; defaults are English.
#[derive(Debug, Clone)]
pub struct NarrationLabels {
    /// Positional phrase with `{current}` and `{total}` placeholders.
    pub step_count: String,
    pub minute_singular: String,
    pub minute_plural: String,
    pub second_singular: String,
    pub second_plural: String,
    /// Spoken once when the whole program finishes.
    pub completed: String,
}

impl Default for NarrationLabels {
    fn default() -> Self {
        Self {
            step_count: "Step {current} of {total}".to_string(),
            minute_singular: "minute".to_string(),
            minute_plural: "minutes".to_string(),
            second_singular: "second".to_string(),
            second_plural: "seconds".to_string(),
            completed: "Program completed. Well done.".to_string(),
        }
    }
}

/// Verbalize a duration: "1 minute 30 seconds", "2 minutes", "45 seconds".
/// The minute clause is omitted when zero; at least one clause is always
/// present, so zero seconds reads "0 seconds".
pub fn speech_duration(seconds: u32, labels: &NarrationLabels) -> String {
    let minutes = seconds / 60;
    let remainder = seconds % 60;
    let mut parts = Vec::new();
    if minutes > 0 {
        let unit = if minutes == 1 {
            &labels.minute_singular
        } else {
            &labels.minute_plural
        };
        parts.push(format!("{minutes} {unit}"));
    }
    if remainder > 0 || parts.is_empty() {
        let unit = if remainder == 1 {
            &labels.second_singular
        } else {
            &labels.second_plural
        };
        parts.push(format!("{remainder} {unit}"));
    }
    parts.join(" ")
}

/// Full step announcement: name, position, optional description, duration.
pub(crate) fn build_instruction(
    exercise: &Exercise,
    step_duration: u32,
    index: usize,
    total: usize,
    labels: &NarrationLabels,
) -> String {
    let position = labels
        .step_count
        .replace("{current}", &(index + 1).to_string())
        .replace("{total}", &total.to_string());
    let mut parts = vec![format!("{}.", exercise.name), format!("{position}.")];
    if !exercise.description.is_empty() {
        parts.push(exercise.description.clone());
    }
    parts.push(format!("{}.", speech_duration(step_duration, labels)));
    parts.join(" ")
}
