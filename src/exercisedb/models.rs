//! Exercise lookup API models.
//!
//! Contains the exercise record and the provider payload it is decoded from.

use serde::{Deserialize, Serialize};

/// Structured description of a single exercise.
///
/// Immutable once fetched; the cache hands out clones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    /// Provider identifier (e.g. "0001")
    pub id: String,
    /// Exercise name, also used as the related-videos query
    pub name: String,
    /// Primary target muscle
    pub target: String,
    /// Required equipment
    pub equipment: String,
    /// Body part the exercise trains
    pub body_part: String,
    /// Other muscles involved
    pub secondary_muscles: Vec<String>,
    /// Step-by-step instructions
    pub instructions: Vec<String>,
    /// Animated demonstration URL
    pub media_url: String,
}

impl Exercise {
    /// Secondary muscles as a comma separated list, or "none".
    pub fn format_secondary_muscles(&self) -> String {
        if self.secondary_muscles.is_empty() {
            "none".to_string()
        } else {
            self.secondary_muscles.join(", ")
        }
    }

    /// Instructions prefixed with their 1-based step number.
    pub fn numbered_instructions(&self) -> Vec<String> {
        self.instructions
            .iter()
            .enumerate()
            .map(|(idx, step)| format!("{}. {}", idx + 1, step))
            .collect()
    }
}

/// Exercise payload as returned by the lookup endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiExercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub equipment: String,
    #[serde(rename = "bodyPart", default)]
    pub body_part: String,
    #[serde(rename = "secondaryMuscles", default)]
    pub secondary_muscles: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(rename = "gifUrl", default)]
    pub gif_url: String,
}

impl From<ApiExercise> for Exercise {
    fn from(item: ApiExercise) -> Self {
        Self {
            id: item.id,
            name: item.name,
            target: item.target,
            equipment: item.equipment,
            body_part: item.body_part,
            secondary_muscles: item.secondary_muscles,
            instructions: item.instructions,
            media_url: item.gif_url,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_exercise(id: &str, name: &str) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: name.to_string(),
        target: "abs".to_string(),
        equipment: "body weight".to_string(),
        body_part: "waist".to_string(),
        secondary_muscles: vec!["hip flexors".to_string(), "lower back".to_string()],
        instructions: vec![
            "Lie flat on your back.".to_string(),
            "Lift your upper body.".to_string(),
        ],
        media_url: format!("https://media.example/{}.gif", id),
    }
}
