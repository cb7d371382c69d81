pub mod domain;
pub mod error;

pub use domain::job::{Job, JobPatch, JobStatus};
pub use domain::report::{
    ArtifactFormat, ArtifactSet, Citation, CompetitorProfile, FinancialSnapshot, JobError,
    JobResult, MarketAssessment, MarketSize, NewsItem, RegulatoryAssessment, RegulatoryFinding,
    ResearchBrief, RiskLevel, RoadmapStep, Scenario, SynthesisReport, UnitEconomic, Verdict,
};
pub use domain::request::{AnalysisRequest, Clarification};
pub use domain::stage::Stage;
pub use error::CoreError;
