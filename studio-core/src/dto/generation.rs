//! Generation DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::JobId;

/// Maximum number of reference images sent with one create/random request
pub const MAX_REFERENCE_IMAGES: usize = 15;

/// Default aspect ratio of seed images
pub const DEFAULT_ASPECT_RATIO: &str = "1:1";

/// Pose and angle prompts used for a 20-shot character turnaround
pub const DEFAULT_TURNAROUND_PROMPTS: [&str; 20] = [
    "in the same style and medium as the reference image, this character seen from the front, full body, standing in a relaxed pose, clean even lighting, simple background",
    "in the same style and medium as the reference image, this character seen from the left side, full body, neutral pose, clean even lighting, simple background",
    "in the same style and medium as the reference image, this character seen from behind, full body, simple background, even lighting",
    "in the same style and medium as the reference image, this character seen from the right side, full body, neutral standing pose, simple background",
    "in the same style and medium as the reference image, this character in a three-quarter view from the front-left, medium distance, neutral lighting",
    "in the same style and medium as the reference image, close up on this character's face, head and shoulders, detailed features visible, clean lighting",
    "in the same style and medium as the reference image, close up on this character's face from a slight angle, warm lighting",
    "in the same style and medium as the reference image, this character's face in dramatic side lighting, close up, simple background",
    "in the same style and medium as the reference image, this character sitting casually, full body visible, relaxed pose, neutral background",
    "in the same style and medium as the reference image, this character crouching down, seen from a slight angle, neutral lighting, simple background",
    "in the same style and medium as the reference image, this character with arms crossed, confident pose, front view, medium distance",
    "in the same style and medium as the reference image, this character walking, mid-stride, seen from the side, clean lighting",
    "in the same style and medium as the reference image, this character looking up, seen from a low angle, dramatic perspective",
    "in the same style and medium as the reference image, this character seen from above, looking up at the camera, interesting angle",
    "in the same style and medium as the reference image, full body of this character in warm golden light, simple background",
    "in the same style and medium as the reference image, this character in cool blue lighting, medium shot, moody atmosphere",
    "in the same style and medium as the reference image, this character in dramatic rim lighting, dark background, silhouette edge visible",
    "in the same style and medium as the reference image, this character leaning against something, casual pose, three-quarter view",
    "in the same style and medium as the reference image, this character in an action pose, dynamic angle, full body visible",
    "in the same style and medium as the reference image, this character in natural outdoor lighting, full body, relaxed stance, simple environment",
];

/// Request for a seed image generated from text only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRequest {
    pub prompt: String,
    pub aspect_ratio: String,
}

impl SeedRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
        }
    }
}

/// Request for a scene featuring a character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    pub prompt: String,
    pub reference_image_urls: Vec<String>,
    pub input_image_url: Option<String>,
}

/// Request for a random scene featuring a character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomRequest {
    pub reference_image_urls: Vec<String>,
    pub character_description: String,
}

/// Request for a character turnaround batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnaroundRequest {
    pub seed_image_url: String,
    pub prompts: Vec<String>,
    pub reference_image_urls: Vec<String>,
}

impl TurnaroundRequest {
    /// Turnaround with the default 20 prompts
    pub fn with_default_prompts(seed_image_url: impl Into<String>) -> Self {
        Self {
            seed_image_url: seed_image_url.into(),
            prompts: DEFAULT_TURNAROUND_PROMPTS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            reference_image_urls: Vec::new(),
        }
    }
}

/// Caps a reference list at [`MAX_REFERENCE_IMAGES`]
pub fn cap_references(urls: &[String]) -> Vec<String> {
    urls.iter().take(MAX_REFERENCE_IMAGES).cloned().collect()
}

/// Response to a single-image generation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub generation_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub credits_used: Option<i64>,
}

impl GenerationResponse {
    pub fn job_id(&self) -> Option<JobId> {
        self.generation_id
            .as_deref()
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())
            .map(JobId::from)
    }
}

/// Response to a turnaround request: one generation per prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnaroundResponse {
    #[serde(default)]
    pub images: Vec<GenerationResponse>,
}

impl TurnaroundResponse {
    /// Job IDs of the generated images, skipping entries without one
    pub fn job_ids(&self) -> Vec<JobId> {
        self.images.iter().filter_map(GenerationResponse::job_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Envelope;

    #[test]
    fn test_turnaround_job_ids_skip_missing() {
        let body = r#"{"data":{"images":[{"generation_id":"a"},{"id":"b"},{}]}}"#;
        let resp: Envelope<TurnaroundResponse> = serde_json::from_str(body).unwrap();
        let ids = resp.into_inner().job_ids();
        assert_eq!(ids, vec![JobId::from("a"), JobId::from("b")]);
    }

    #[test]
    fn test_default_turnaround_has_twenty_prompts() {
        let req = TurnaroundRequest::with_default_prompts("https://seed");
        assert_eq!(req.prompts.len(), 20);
        assert!(req.reference_image_urls.is_empty());
    }

    #[test]
    fn test_cap_references() {
        let urls: Vec<String> = (0..20).map(|i| format!("u{i}")).collect();
        assert_eq!(cap_references(&urls).len(), MAX_REFERENCE_IMAGES);
    }
}
