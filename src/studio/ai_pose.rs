//! Text to pose synthesis through a remote generative model.

use std::{sync::Arc, time::Duration};

use serde::Deserialize;
use smplx::{PosePatch, params::BODY_POSE_LEN};
use tracing::{error, info};

pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("No API key configured; pass --api-key or set GEMINI_API_KEY")]
    MissingApiKey,
    #[error("Request failed: {0}")]
    Request(#[from] Box<ureq::Error>),
    #[error("Could not read the response: {0}")]
    Read(#[from] std::io::Error),
    #[error("The response contained no text")]
    EmptyResponse,
    #[error("The model returned invalid pose JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("The model returned non-finite {0} values")]
    NonFinite(&'static str),
}

/// The part of the parameters a model can produce. Array lengths are not checked here; merging
/// into the parameters pads or truncates them.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SynthesizedPose {
    pub body_pose: Vec<f32>,
    #[serde(default)]
    pub expression: Option<Vec<f32>>,
}

impl SynthesizedPose {
    /// The rest pose, used whenever synthesis fails.
    pub fn fallback() -> Self {
        Self {
            body_pose: vec![0.0; BODY_POSE_LEN],
            expression: None,
        }
    }

    /// The body pose is always replaced; the expression only when the model produced one.
    pub fn into_patch(self) -> PosePatch {
        PosePatch {
            body_pose: Some(self.body_pose),
            expression: self.expression,
            ..Default::default()
        }
    }
}

/// Something that can turn a prompt into a pose.
pub trait PoseBackend: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<SynthesizedPose, AiError>;
}

/// Calls the Gemini `generateContent` REST endpoint with a JSON response schema.
pub struct GeminiBackend {
    agent: ureq::Agent,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiBackend {
    pub fn new(api_key: Option<String>, model: String, endpoint: String) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model,
            endpoint,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

impl PoseBackend for GeminiBackend {
    fn generate(&self, prompt: &str) -> Result<SynthesizedPose, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let response: GenerateContentResponse = self
            .agent
            .post(&self.url())
            .set("x-goog-api-key", api_key)
            .send_json(request_body(prompt))
            .map_err(Box::new)?
            .into_json()?;

        parse_pose(&response.text().ok_or(AiError::EmptyResponse)?)
    }
}

fn request_body(prompt: &str) -> serde_json::Value {
    let instructions = format!(
        "Create an SMPL-X body pose for the action: \"{prompt}\".\n\
         Return the pose as axis-angle values (radians) for 22 joints (66 floats).\n\
         Format the output as JSON with the key 'body_pose'."
    );

    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": instructions }],
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "body_pose": {
                        "type": "ARRAY",
                        "items": { "type": "NUMBER" },
                        "description": "Array of 66 floats representing 22 body joints in axis-angle format.",
                    },
                    "expression": {
                        "type": "ARRAY",
                        "items": { "type": "NUMBER" },
                        "description": "Array of 10 floats for facial expression.",
                    },
                },
                "required": ["body_pose"],
            },
        },
    })
}

fn parse_pose(text: &str) -> Result<SynthesizedPose, AiError> {
    let pose: SynthesizedPose = serde_json::from_str(text.trim())?;
    match pose.clone().into_patch().non_finite_field() {
        Some(field) => Err(AiError::NonFinite(field)),
        None => Ok(pose),
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// All the text parts of the first candidate joined together.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Runs prompts through a backend and never fails: errors are logged and replaced with the
/// fallback pose.
#[derive(Clone)]
pub struct PoseService {
    backend: Arc<dyn PoseBackend>,
}

impl PoseService {
    pub fn new(backend: Arc<dyn PoseBackend>) -> Self {
        Self { backend }
    }

    pub fn synthesize(&self, prompt: &str) -> SynthesizedPose {
        match self.backend.generate(prompt) {
            Ok(pose) => {
                info!(
                    "Synthesized pose with {} body values for {prompt:?}",
                    pose.body_pose.len()
                );
                pose
            }
            Err(err) => {
                error!("Pose synthesis failed: {err}");
                SynthesizedPose::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use smplx::PoseParameters;

    use super::*;

    struct Failing;

    impl PoseBackend for Failing {
        fn generate(&self, _prompt: &str) -> Result<SynthesizedPose, AiError> {
            Err(AiError::EmptyResponse)
        }
    }

    struct Fixed(&'static str);

    impl PoseBackend for Fixed {
        fn generate(&self, _prompt: &str) -> Result<SynthesizedPose, AiError> {
            parse_pose(self.0)
        }
    }

    #[test]
    fn failures_fall_back_to_the_rest_pose() {
        let service = PoseService::new(Arc::new(Failing));
        let pose = service.synthesize("jumping jacks");
        assert_eq!(pose.body_pose, vec![0.0; 66]);
        assert_eq!(pose.expression, None);
    }

    #[test]
    fn invalid_json_falls_back() {
        let service = PoseService::new(Arc::new(Fixed("{\"body_pose\": [0.1, ")));
        assert_eq!(service.synthesize("wave"), SynthesizedPose::fallback());

        let service = PoseService::new(Arc::new(Fixed("{}")));
        assert_eq!(service.synthesize("wave"), SynthesizedPose::fallback());
    }

    #[test]
    fn out_of_range_numbers_fall_back() {
        assert!(matches!(
            parse_pose(r#"{"body_pose": [1e39, 0, 0]}"#),
            Err(AiError::NonFinite("body_pose"))
        ));
        assert!(matches!(
            parse_pose(r#"{"body_pose": [0, 0, 0], "expression": [-1e39]}"#),
            Err(AiError::NonFinite("expression"))
        ));

        let service = PoseService::new(Arc::new(Fixed(r#"{"body_pose": [0.2, 1e39, 0]}"#)));
        assert_eq!(service.synthesize("wave"), SynthesizedPose::fallback());
    }

    #[test]
    fn missing_api_key_falls_back() {
        let backend = GeminiBackend::new(
            Some(String::from("  ")),
            String::from(DEFAULT_MODEL),
            String::from(DEFAULT_ENDPOINT),
        );
        assert!(matches!(
            backend.generate("sit"),
            Err(AiError::MissingApiKey)
        ));

        let service = PoseService::new(Arc::new(backend));
        assert_eq!(service.synthesize("sit"), SynthesizedPose::fallback());
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        let backend = GeminiBackend::new(
            None,
            String::from("some-model"),
            String::from("https://example.com/v1beta/"),
        );
        assert_eq!(
            backend.url(),
            "https://example.com/v1beta/models/some-model:generateContent"
        );
    }

    #[test]
    fn request_asks_for_a_json_body_pose() {
        let body = request_body("a person waving");
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("\"a person waving\""));
        assert!(text.contains("66 floats"));

        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(
            config["responseSchema"]["required"],
            serde_json::json!(["body_pose"])
        );
        assert_eq!(
            config["responseSchema"]["properties"]["expression"]["type"],
            "ARRAY"
        );
    }

    #[test]
    fn response_text_is_parsed() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "{\"body_pose\": [0.5, 0, 0], \"expression\": [1]}" }]
                    },
                    "finishReason": "STOP"
                }],
                "usageMetadata": { "totalTokenCount": 10 }
            }"#,
        )
        .unwrap();

        let pose = parse_pose(&response.text().unwrap()).unwrap();
        assert_eq!(pose.body_pose, vec![0.5, 0.0, 0.0]);
        assert_eq!(pose.expression, Some(vec![1.0]));
    }

    #[test]
    fn responses_without_candidates_have_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn merge_replaces_body_pose_and_keeps_missing_expression() {
        let mut params = PoseParameters::default();
        params.expression[0] = 0.7;
        params.betas[0] = 1.0;

        let pose = SynthesizedPose {
            body_pose: vec![0.2; 10],
            expression: None,
        };
        params.merge(pose.into_patch());

        assert_eq!(params.body_pose.len(), 66);
        assert_eq!(&params.body_pose[..10], &[0.2; 10]);
        assert!(params.body_pose[10..].iter().all(|&v| v == 0.0));
        assert_eq!(params.expression[0], 0.7);
        assert_eq!(params.betas[0], 1.0);

        let pose = SynthesizedPose {
            body_pose: vec![0.0; 66],
            expression: Some(vec![-0.5; 10]),
        };
        params.merge(pose.into_patch());
        assert_eq!(params.expression, vec![-0.5; 10]);
    }
}
