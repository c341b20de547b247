//! Payload checks run before any network call
//!
//! A payload that fails here never leaves the process; the caller gets a
//! [`VocalisError::Validation`] naming the offending field.

use crate::errors::{Result, VocalisError};
use crate::types::{
    AnalysisRequest, AppModelUpdate, ConsumerCredentials, ConsumerUpdate, NewAppModel,
    NewConsumer, Submission, WorkflowSubject,
};

/// Implemented by every payload the client sends
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VocalisError::Validation(format!("'{field}' must not be empty")));
    }
    Ok(())
}

fn require_positive(field: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(VocalisError::Validation(format!("'{field}' must be greater than zero")));
    }
    Ok(())
}

impl Validate for NewAppModel {
    fn validate(&self) -> Result<()> {
        if self.vocabulary.is_empty() {
            return Err(VocalisError::Validation("'vocabulary' must not be empty".into()));
        }
        for word in &self.vocabulary {
            require_non_empty("vocabulary", word)?;
        }
        require_positive("verificationLength", self.verification_length)?;
        require_positive("enrollmentRepeats", self.enrollment_repeats)
    }
}

impl Validate for AppModelUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(repeats) = self.enrollment_repeats {
            require_positive("enrollmentRepeats", repeats)?;
        }
        Ok(())
    }
}

impl Validate for NewConsumer {
    // gender is constrained to M/F by its type
    fn validate(&self) -> Result<()> {
        require_non_empty("username", &self.username)?;
        require_non_empty("password", &self.password)
    }
}

impl Validate for ConsumerUpdate {
    fn validate(&self) -> Result<()> {
        require_non_empty("password", &self.password)
    }
}

impl Validate for ConsumerCredentials {
    fn validate(&self) -> Result<()> {
        require_non_empty("username", &self.username)?;
        require_non_empty("password", &self.password)
    }
}

impl Validate for WorkflowSubject {
    fn validate(&self) -> Result<()> {
        require_non_empty("application", &self.application)?;
        require_non_empty("consumer", &self.consumer)
    }
}

impl Validate for AnalysisRequest {
    fn validate(&self) -> Result<()> {
        require_non_empty("audioUrl", &self.audio_url)?;
        if let Some(words) = self.words {
            require_positive("words", words)?;
        }
        Ok(())
    }
}

impl Validate for Submission {
    fn validate(&self) -> Result<()> {
        require_non_empty("audio", &self.audio_url)?;
        if self.intervals.is_empty() {
            return Err(VocalisError::Validation("at least one interval is required".into()));
        }
        for (index, interval) in self.intervals.iter().enumerate() {
            if interval.phrase.trim().is_empty() {
                return Err(VocalisError::Validation(format!(
                    "interval {index} has an empty phrase"
                )));
            }
            if interval.start >= interval.stop {
                return Err(VocalisError::Validation(format!(
                    "interval {index} must start before it stops ({} >= {})",
                    interval.start, interval.stop
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, Interval};

    fn vocabulary() -> Vec<String> {
        vec!["boston".into(), "chicago".into(), "pyramid".into()]
    }

    #[test]
    fn test_app_model_requires_all_fields() {
        assert!(NewAppModel::new(vocabulary(), 3, 3).validate().is_ok());
        assert!(NewAppModel::new(vec![], 3, 3).validate().is_err());
        assert!(NewAppModel::new(vocabulary(), 0, 3).validate().is_err());

        let err = NewAppModel::new(vocabulary(), 3, 0).validate().unwrap_err();
        assert!(err.to_string().contains("enrollmentRepeats"));
    }

    #[test]
    fn test_consumer_requires_credentials() {
        let consumer = NewConsumer {
            username: "theo".into(),
            password: "walcott".into(),
            gender: Gender::Male,
        };
        assert!(consumer.validate().is_ok());

        let blank = NewConsumer { password: "  ".into(), ..consumer };
        assert!(matches!(blank.validate(), Err(VocalisError::Validation(_))));
    }

    #[test]
    fn test_analysis_request() {
        assert!(AnalysisRequest::new("https://a/x.wav").with_words(3).validate().is_ok());
        assert!(AnalysisRequest::new("").validate().is_err());
        assert!(AnalysisRequest::new("https://a/x.wav").with_words(0).validate().is_err());
    }

    #[test]
    fn test_submission_intervals() {
        let ok = Submission::new("https://a/e.wav", vec![Interval::new("boston", 0, 400)]);
        assert!(ok.validate().is_ok());

        let empty = Submission::new("https://a/e.wav", vec![]);
        assert!(empty.validate().is_err());

        let inverted = Submission::new("https://a/e.wav", vec![Interval::new("boston", 400, 400)]);
        assert!(inverted.validate().is_err());

        let unlabeled = Submission::new("https://a/e.wav", vec![Interval::new("", 0, 400)]);
        assert!(unlabeled.validate().is_err());

        let no_audio = Submission::new(" ", vec![Interval::new("boston", 0, 400)]);
        assert!(no_audio.validate().is_err());
    }
}
