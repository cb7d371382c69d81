use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;

pub const MAX_COMPANY_NAME_LEN: usize = 200;
pub const MAX_INDUSTRY_LEN: usize = 100;
pub const MIN_QUESTION_LEN: usize = 10;
pub const MAX_QUESTION_LEN: usize = 1000;

/// A clarifying question raised before submission, together with the
/// answer the caller gave. Carried into agent prompts as extra context.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Clarification {
    pub question: String,
    pub answer: String,
}

/// What the caller wants analyzed. Immutable once a job is created.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct AnalysisRequest {
    pub company_name: String,
    #[serde(default)]
    pub industry: Option<String>,
    pub strategic_question: String,
    #[serde(default)]
    pub clarification: Option<Clarification>,
}

impl AnalysisRequest {
    pub fn new(
        company_name: impl Into<String>,
        industry: impl Into<String>,
        strategic_question: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            industry: Some(industry.into()),
            strategic_question: strategic_question.into(),
            clarification: None,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let company = self.company_name.trim();
        if company.is_empty() {
            return Err(CoreError::Validation("company_name must not be empty".into()));
        }
        if company.len() > MAX_COMPANY_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "company_name exceeds {MAX_COMPANY_NAME_LEN} characters"
            )));
        }

        if let Some(industry) = &self.industry {
            let industry = industry.trim();
            if industry.is_empty() {
                return Err(CoreError::Validation("industry must not be empty".into()));
            }
            if industry.len() > MAX_INDUSTRY_LEN {
                return Err(CoreError::Validation(format!(
                    "industry exceeds {MAX_INDUSTRY_LEN} characters"
                )));
            }
        }

        let question = self.strategic_question.trim();
        if question.len() < MIN_QUESTION_LEN {
            return Err(CoreError::Validation(format!(
                "strategic_question must be at least {MIN_QUESTION_LEN} characters"
            )));
        }
        if question.len() > MAX_QUESTION_LEN {
            return Err(CoreError::Validation(format!(
                "strategic_question exceeds {MAX_QUESTION_LEN} characters"
            )));
        }

        Ok(())
    }
}
