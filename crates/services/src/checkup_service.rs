use std::sync::Arc;

use log::info;

use care_core::model::{CheckupForm, RiskAssessment};

use crate::api::AssistantApi;
use crate::error::CheckupServiceError;

/// Runs the PCOD risk model on a completed checkup form.
#[derive(Clone)]
pub struct CheckupService {
    assistant: Arc<dyn AssistantApi>,
}

impl CheckupService {
    #[must_use]
    pub fn new(assistant: Arc<dyn AssistantApi>) -> Self {
        Self { assistant }
    }

    /// # Errors
    ///
    /// Returns `CheckupServiceError::Validation` without contacting the model
    /// when consent is missing, or `CheckupServiceError::Api` on failure.
    pub async fn assess(&self, form: &CheckupForm) -> Result<RiskAssessment, CheckupServiceError> {
        let features = form.to_features()?;
        let assessment = self.assistant.predict(&features).await?;
        info!("risk model returned prediction {}", assessment.prediction);
        Ok(assessment)
    }
}
