//! Typed request and response bodies for the remote collections
//!
//! Response bodies are decoded once at the adapter boundary. Fields the
//! client does not interpret are kept in `extra` so callers still see the
//! full server document.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::interval::{Interval, TimeSpan};
use crate::types::status::{AnalysisStatus, EnrollmentStatus, VerificationStatus};

/// The remote collections this client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    AppModel,
    Consumer,
    Enrollment,
    Verification,
    Analysis,
}

impl ResourceKind {
    /// Path segment of the collection, relative to the API base URL
    pub fn collection(self) -> &'static str {
        match self {
            Self::AppModel => "app-models",
            Self::Consumer => "consumers",
            Self::Enrollment => "enrollments",
            Self::Verification => "verifications",
            Self::Analysis => "analysis",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AppModel => "app model",
            Self::Consumer => "consumer",
            Self::Enrollment => "enrollment",
            Self::Verification => "verification",
            Self::Analysis => "analysis",
        };
        f.write_str(name)
    }
}

/// Extract the resource identifier from a locator: its final path segment.
///
/// Query strings, fragments and trailing slashes are ignored. For an absolute
/// locator only the path after the authority counts. Returns `None` when no
/// non-empty segment remains.
pub fn resource_id_from_href(href: &str) -> Option<&str> {
    let locator = href.split(['?', '#']).next().unwrap_or_default();
    let path = match locator.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |at| &rest[at..]),
        None => locator,
    };
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
}

/// Body of a create or update response: the locator of the touched resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLocator {
    pub href: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceLocator {
    /// Identifier of the located resource
    pub fn id(&self) -> Option<&str> {
        resource_id_from_href(&self.href)
    }
}

/// One page of a collection listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

/// Listing window, `limit=10&offset=0` unless set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl PageRequest {
    /// Page of `limit` items starting at `offset`
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { limit: crate::constants::DEFAULT_PAGE_LIMIT, offset: 0 }
    }
}

// ---------------------------------------------------------------------------
// App models
// ---------------------------------------------------------------------------

/// An application model: the vocabulary speakers enroll and verify against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppModel {
    #[serde(default)]
    pub href: Option<String>,
    pub vocabulary: Vec<String>,
    pub verification_length: u32,
    pub enrollment_repeats: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload creating an app model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppModel {
    pub vocabulary: Vec<String>,
    pub verification_length: u32,
    pub enrollment_repeats: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl NewAppModel {
    /// App model without a threshold
    pub fn new(vocabulary: Vec<String>, verification_length: u32, enrollment_repeats: u32) -> Self {
        Self { vocabulary, verification_length, enrollment_repeats, threshold: None }
    }
}

/// Partial update of an app model; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppModelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_repeats: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_threshold_enable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_threshold_clearance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_threshold_max_rise: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_model_update: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_update_daily_limit: Option<u32>,
}

// ---------------------------------------------------------------------------
// Consumers
// ---------------------------------------------------------------------------

/// Consumer gender as the service encodes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

/// A speaker registered with the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload creating a consumer
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConsumer {
    pub username: String,
    pub password: String,
    pub gender: Gender,
}

impl fmt::Debug for NewConsumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewConsumer")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("gender", &self.gender)
            .finish()
    }
}

/// Payload updating a consumer
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerUpdate {
    pub password: String,
}

impl fmt::Debug for ConsumerUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerUpdate").field("password", &"<redacted>").finish()
    }
}

/// Username and password exchanged for a per-consumer token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerCredentials {
    pub username: String,
    pub password: String,
}

impl ConsumerCredentials {
    /// Credentials for one consumer
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl fmt::Debug for ConsumerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Enrollments and verifications
// ---------------------------------------------------------------------------

/// The app model and consumer an enrollment or verification is created for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSubject {
    pub application: String,
    pub consumer: String,
}

impl WorkflowSubject {
    /// Subject from an app model id and a consumer id
    pub fn new(app_model_id: impl Into<String>, consumer_id: impl Into<String>) -> Self {
        Self { application: app_model_id.into(), consumer: consumer_id.into() }
    }
}

/// Enrollment resource as fetched from the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub href: String,
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub instructions: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Verification resource as fetched from the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub href: String,
    pub status: VerificationStatus,
    #[serde(default)]
    pub instructions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Recorded audio plus the labeled intervals inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub audio_url: String,
    pub intervals: Vec<Interval>,
}

impl Submission {
    /// Submission of one recording and its labeled intervals
    pub fn new(audio_url: impl Into<String>, intervals: Vec<Interval>) -> Self {
        Self { audio_url: audio_url.into(), intervals }
    }

    /// JSON body with the audio reference stored under `audio_field`
    /// (`enrollment.wav` or `verification.wav`).
    pub fn to_payload(&self, audio_field: &str) -> Value {
        let mut body = Map::new();
        body.insert(audio_field.to_string(), Value::String(self.audio_url.clone()));
        body.insert(
            "intervals".to_string(),
            Value::Array(
                self.intervals
                    .iter()
                    .map(|interval| {
                        serde_json::json!({
                            "phrase": interval.phrase,
                            "start": interval.start,
                            "stop": interval.stop,
                        })
                    })
                    .collect(),
            ),
        );
        Value::Object(body)
    }
}

// ---------------------------------------------------------------------------
// Endpoint analysis
// ---------------------------------------------------------------------------

/// Payload starting an endpoint analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub audio_url: String,
    /// Number of words the speaker was asked to say
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<u32>,
}

impl AnalysisRequest {
    /// Analysis of the recording at `audio_url`
    pub fn new(audio_url: impl Into<String>) -> Self {
        Self { audio_url: audio_url.into(), words: None }
    }

    /// Tell the service how many words to expect
    pub fn with_words(mut self, words: u32) -> Self {
        self.words = Some(words);
        self
    }
}

/// Endpoint-analysis task as fetched from the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisTask {
    pub task_name: String,
    pub task_status: AnalysisStatus,
    #[serde(default)]
    pub intervals: Option<Vec<TimeSpan>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_from_href() {
        assert_eq!(
            resource_id_from_href("https://api.example.com/v1/enrollments/abc123"),
            Some("abc123")
        );
        assert_eq!(resource_id_from_href("/v1/consumers/c9/"), Some("c9"));
        assert_eq!(resource_id_from_href("https://h/v1/app-models/m1?x=1#f"), Some("m1"));
        assert_eq!(resource_id_from_href("abc"), Some("abc"));
        assert_eq!(resource_id_from_href(""), None);
        assert_eq!(resource_id_from_href("https://"), None);
    }

    #[test]
    fn test_locator_without_path_has_no_id() {
        assert_eq!(resource_id_from_href("https://api.example.com"), None);
        assert_eq!(resource_id_from_href("https://api.example.com/"), None);
        assert_eq!(resource_id_from_href("https://api.example.com?page=2"), None);
        assert_eq!(resource_id_from_href("https://api.example.com:8443/"), None);
        assert_eq!(resource_id_from_href("https://api.example.com/c1"), Some("c1"));
    }

    #[test]
    fn test_enrollment_keeps_unknown_fields() {
        let body = serde_json::json!({
            "href": "https://h/v1/enrollments/e1",
            "status": "created",
            "instructions": {"data": ["boston"]},
            "consumer": {"href": "https://h/v1/consumers/c1"}
        });
        let enrollment: Enrollment = serde_json::from_value(body).unwrap();

        assert_eq!(enrollment.status, EnrollmentStatus::Created);
        assert!(enrollment.instructions.is_some());
        assert!(enrollment.extra.contains_key("consumer"));
    }

    #[test]
    fn test_submission_payload_uses_audio_field() {
        let submission =
            Submission::new("https://audio/e.wav", vec![Interval::new("boston", 10, 900)]);
        let payload = submission.to_payload("enrollment.wav");

        assert_eq!(payload["enrollment.wav"], "https://audio/e.wav");
        assert_eq!(payload["intervals"][0]["phrase"], "boston");
        assert_eq!(payload["intervals"][0]["stop"], 900);
    }

    #[test]
    fn test_analysis_request_json() {
        let json = serde_json::to_value(AnalysisRequest::new("https://a/x.wav").with_words(3))
            .unwrap();
        assert_eq!(json, serde_json::json!({"audioUrl": "https://a/x.wav", "words": 3}));

        let json = serde_json::to_value(AnalysisRequest::new("https://a/x.wav")).unwrap();
        assert!(json.get("words").is_none());
    }

    #[test]
    fn test_analysis_task_decodes_intervals() {
        let task: AnalysisTask = serde_json::from_value(serde_json::json!({
            "taskName": "t-1",
            "taskStatus": "completed",
            "intervals": [{"start": 0, "stop": 500}, {"start": 700, "stop": 1300}]
        }))
        .unwrap();

        assert_eq!(task.task_status, AnalysisStatus::Completed);
        assert_eq!(task.intervals.map(|i| i.len()), Some(2));
    }

    #[test]
    fn test_page_defaults() {
        let page: Page<Consumer> = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, None);
        assert_eq!(PageRequest::default(), PageRequest::new(10, 0));
    }
}
