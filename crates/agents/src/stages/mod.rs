mod analyst;
mod regulatory;
mod research;
mod synthesizer;

pub use analyst::AnalystAgent;
pub use regulatory::RegulatoryAgent;
pub use research::ResearchAgent;
pub use synthesizer::SynthesizerAgent;
