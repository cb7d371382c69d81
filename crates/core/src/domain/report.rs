use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::stage::Stage;

// ============================================
// Enums
// ============================================

/// Regulatory exposure for the proposed move
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// No material blockers identified
    Low,
    /// Manageable with standard compliance work
    #[default]
    Medium,
    /// Significant blockers, dedicated mitigation required
    High,
    /// Likely deal-breaking without restructuring
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Bottom-line recommendation of the synthesized report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Proceed with the move as framed
    Go,
    /// Proceed only if the named conditions are met
    #[default]
    Conditional,
    /// Do not proceed
    NoGo,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Conditional => "conditional",
            Self::NoGo => "no_go",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "go" => Some(Self::Go),
            "conditional" => Some(Self::Conditional),
            "no_go" | "no-go" => Some(Self::NoGo),
            _ => None,
        }
    }
}

/// Deliverable format for a generated report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    Pdf,
    Pptx,
    Json,
}

impl ArtifactFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Pptx => "pptx",
            Self::Json => "json",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "pptx" => Some(Self::Pptx),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Self::Json => "application/json",
        }
    }

    pub fn all() -> [ArtifactFormat; 3] {
        [Self::Pdf, Self::Pptx, Self::Json]
    }
}

// ============================================
// Research stage output
// ============================================

/// Source backing a research claim
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Citation {
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Publication date as reported by the source, free-form
    #[serde(default)]
    pub date: Option<String>,
    /// Relevance to the strategic question (0.0 - 1.0)
    #[serde(default = "default_relevance")]
    pub relevance_score: f32,
}

fn default_relevance() -> f32 {
    0.5
}

/// A competitor already active in the target market
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CompetitorProfile {
    pub name: String,
    /// What makes this competitor relevant (position, share, strategy)
    pub note: String,
}

/// Recent news relevant to the question
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct NewsItem {
    pub source: String,
    pub title: String,
    pub summary: String,
}

/// Headline financials for the subject company, where public
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct FinancialSnapshot {
    #[serde(default)]
    pub ticker: Option<String>,
    /// Trailing annual revenue
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Output of the research stage: grounding material for everything
/// downstream.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ResearchBrief {
    /// Facts the downstream agents should treat as established
    #[serde(default)]
    pub key_findings: Vec<String>,
    /// Narrative overview of the market the question concerns
    #[serde(default)]
    pub market_context: String,
    #[serde(default)]
    pub competitors: Vec<CompetitorProfile>,
    #[serde(default)]
    pub news_highlights: Vec<NewsItem>,
    #[serde(default)]
    pub financials: Option<FinancialSnapshot>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

// ============================================
// Analyst stage output
// ============================================

/// Addressable market sizing
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MarketSize {
    /// Total addressable market
    #[serde(default)]
    pub tam: f64,
    /// Serviceable addressable market
    #[serde(default)]
    pub sam: f64,
    /// Serviceable obtainable market
    #[serde(default)]
    pub som: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Single unit-economics metric (e.g. CAC, AOV, contribution margin)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct UnitEconomic {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

/// Revenue scenario over the modeled horizon
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Scenario {
    /// e.g. "base", "bull", "bear"
    pub name: String,
    pub summary: String,
    #[serde(default)]
    pub projected_revenue: f64,
}

/// Output of the analyst stage: market sizing and financial modeling.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MarketAssessment {
    #[serde(default)]
    pub market_size: MarketSize,
    #[serde(default)]
    pub unit_economics: Vec<UnitEconomic>,
    /// Narrative on expected revenue development
    #[serde(default)]
    pub revenue_outlook: String,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

// ============================================
// Regulatory stage output
// ============================================

/// One regulatory topic and its assessment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RegulatoryFinding {
    /// e.g. "foreign direct investment", "data residency", "tax"
    pub topic: String,
    pub summary: String,
}

/// Output of the regulatory stage: compliance exposure for the move.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RegulatoryAssessment {
    #[serde(default)]
    pub overall_risk: RiskLevel,
    #[serde(default)]
    pub findings: Vec<RegulatoryFinding>,
    /// Issues that block the move outright until resolved
    #[serde(default)]
    pub key_blockers: Vec<String>,
    /// Ordered steps to reach compliance
    #[serde(default)]
    pub compliance_roadmap: Vec<String>,
}

// ============================================
// Synthesis stage output
// ============================================

/// One phase of the recommended implementation plan
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RoadmapStep {
    pub title: String,
    pub focus: String,
}

/// Output of the synthesis stage: the report the caller actually reads.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SynthesisReport {
    #[serde(default)]
    pub executive_summary: String,
    #[serde(default)]
    pub verdict: Verdict,
    #[serde(default)]
    pub key_recommendations: Vec<String>,
    #[serde(default)]
    pub implementation_roadmap: Vec<RoadmapStep>,
    /// How success of the move should be measured
    #[serde(default)]
    pub success_metrics: Vec<String>,
}

// ============================================
// Assembled job result
// ============================================

/// Paths of the generated deliverables, keyed by format. A format is
/// absent when its artifact was never produced.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ArtifactSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pptx: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,
}

impl ArtifactSet {
    pub fn get(&self, format: ArtifactFormat) -> Option<&str> {
        match format {
            ArtifactFormat::Pdf => self.pdf.as_deref(),
            ArtifactFormat::Pptx => self.pptx.as_deref(),
            ArtifactFormat::Json => self.json.as_deref(),
        }
    }

    pub fn set(&mut self, format: ArtifactFormat, path: impl Into<String>) {
        let path = Some(path.into());
        match format {
            ArtifactFormat::Pdf => self.pdf = path,
            ArtifactFormat::Pptx => self.pptx = path,
            ArtifactFormat::Json => self.json = path,
        }
    }

    pub fn available(&self) -> Vec<ArtifactFormat> {
        ArtifactFormat::all()
            .into_iter()
            .filter(|f| self.get(*f).is_some())
            .collect()
    }
}

/// Everything a completed job produced, one field per stage plus the
/// deliverable paths.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct JobResult {
    pub research: ResearchBrief,
    pub analysis: MarketAssessment,
    pub regulatory: RegulatoryAssessment,
    pub synthesis: SynthesisReport,
    #[serde(default)]
    pub artifacts: ArtifactSet,
}

/// Why a job failed: the stage that broke and the adapter's message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct JobError {
    pub stage: Stage,
    pub message: String,
}

impl JobError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.message)
    }
}

// ============================================
// Tests
// ============================================
