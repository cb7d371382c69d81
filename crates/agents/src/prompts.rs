use consilium_core::{AnalysisRequest, MarketAssessment, RegulatoryAssessment, ResearchBrief};

const RESEARCH_SCHEMA: &str = r#"{"key_findings": ["string"], "market_context": "string", "competitors": [{"name": "string", "note": "string"}], "news_highlights": [{"source": "string", "title": "string", "summary": "string"}], "financials": {"ticker": "string or null", "revenue": 0.0, "market_cap": 0.0, "currency": "USD"}, "citations": [{"source": "string", "url": "string or null", "date": "string or null", "relevance_score": 0.5}]}"#;

const ANALYST_SCHEMA: &str = r#"{"market_size": {"tam": 0.0, "sam": 0.0, "som": 0.0, "currency": "USD"}, "unit_economics": [{"name": "string", "value": 0.0, "unit": "string"}], "revenue_outlook": "string", "scenarios": [{"name": "base|bull|bear", "summary": "string", "projected_revenue": 0.0}]}"#;

const REGULATORY_SCHEMA: &str = r#"{"overall_risk": "low|medium|high|critical", "findings": [{"topic": "string", "summary": "string"}], "key_blockers": ["string"], "compliance_roadmap": ["string"]}"#;

const SYNTHESIS_SCHEMA: &str = r#"{"executive_summary": "string", "verdict": "go|conditional|no_go", "key_recommendations": ["string"], "implementation_roadmap": [{"title": "string", "focus": "string"}], "success_metrics": ["string"]}"#;

pub struct StagePrompts;

impl StagePrompts {
    pub fn research(request: &AnalysisRequest) -> String {
        format!(
            r#"Research the subject below to ground a strategic analysis.

## Subject
**Company:** {company}
**Industry:** {industry}
**Strategic question:** {question}{clarification}

## Required Output
Respond with a single JSON object in exactly this shape:
{schema}

Only output the JSON object."#,
            company = request.company_name,
            industry = request.industry.as_deref().unwrap_or("Not specified"),
            question = request.strategic_question,
            clarification = clarification_note(request),
            schema = RESEARCH_SCHEMA,
        )
    }

    pub fn analyst(request: &AnalysisRequest, research: &ResearchBrief) -> String {
        format!(
            r#"Size the market and model the financial case for the move below.

## Subject
**Company:** {company}
**Industry:** {industry}
**Strategic question:** {question}{clarification}

## Research Brief
{research}

## Required Output
Respond with a single JSON object in exactly this shape:
{schema}

Only output the JSON object."#,
            company = request.company_name,
            industry = request.industry.as_deref().unwrap_or("Not specified"),
            question = request.strategic_question,
            clarification = clarification_note(request),
            research = digest_research(research),
            schema = ANALYST_SCHEMA,
        )
    }

    pub fn regulatory(request: &AnalysisRequest, research: &ResearchBrief) -> String {
        format!(
            r#"Assess the regulatory and compliance exposure of the move below.

## Subject
**Company:** {company}
**Industry:** {industry}
**Strategic question:** {question}{clarification}

## Research Brief
{research}

## Required Output
Respond with a single JSON object in exactly this shape:
{schema}

Only output the JSON object."#,
            company = request.company_name,
            industry = request.industry.as_deref().unwrap_or("Not specified"),
            question = request.strategic_question,
            clarification = clarification_note(request),
            research = digest_research(research),
            schema = REGULATORY_SCHEMA,
        )
    }

    pub fn synthesis(
        request: &AnalysisRequest,
        research: &ResearchBrief,
        analysis: &MarketAssessment,
        regulatory: &RegulatoryAssessment,
    ) -> String {
        format!(
            r#"Synthesize the findings below into a board-ready recommendation.

## Subject
**Company:** {company}
**Strategic question:** {question}{clarification}

## Research Brief
{research}

## Market Assessment
{analysis}

## Regulatory Assessment
{regulatory}

## Required Output
Respond with a single JSON object in exactly this shape:
{schema}

Only output the JSON object."#,
            company = request.company_name,
            question = request.strategic_question,
            clarification = clarification_note(request),
            research = digest_research(research),
            analysis = digest_analysis(analysis),
            regulatory = digest_regulatory(regulatory),
            schema = SYNTHESIS_SCHEMA,
        )
    }

    pub fn clarify(request: &AnalysisRequest) -> String {
        format!(
            r#"A caller wants the following analyzed:

**Company:** {company}
**Industry:** {industry}
**Strategic question:** {question}

Ask the single most useful clarifying question before the analysis starts.
Output only the question itself, one sentence."#,
            company = request.company_name,
            industry = request.industry.as_deref().unwrap_or("Not specified"),
            question = request.strategic_question,
        )
    }
}

fn clarification_note(request: &AnalysisRequest) -> String {
    match &request.clarification {
        Some(c) => format!(
            "\n**Clarification asked:** {}\n**Answer given:** {}",
            c.question, c.answer
        ),
        None => String::new(),
    }
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- (none)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn digest_research(research: &ResearchBrief) -> String {
    format!(
        "**Market context:** {}\n**Key findings:**\n{}\n**Competitors:** {}",
        research.market_context,
        bullet_list(&research.key_findings),
        research
            .competitors
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn digest_analysis(analysis: &MarketAssessment) -> String {
    format!(
        "**TAM/SAM/SOM:** {} / {} / {} {}\n**Revenue outlook:** {}",
        analysis.market_size.tam,
        analysis.market_size.sam,
        analysis.market_size.som,
        analysis.market_size.currency,
        analysis.revenue_outlook,
    )
}

fn digest_regulatory(regulatory: &RegulatoryAssessment) -> String {
    format!(
        "**Overall risk:** {}\n**Key blockers:**\n{}",
        regulatory.overall_risk.as_str(),
        bullet_list(&regulatory.key_blockers),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use consilium_core::Clarification;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new(
            "Zomato",
            "Food Delivery",
            "Should Zomato expand into Saudi Arabia?",
        )
    }

    #[test]
    fn test_research_prompt_contains_subject() {
        let prompt = StagePrompts::research(&request());
        assert!(prompt.contains("Zomato"));
        assert!(prompt.contains("Food Delivery"));
        assert!(prompt.contains("Saudi Arabia"));
        assert!(prompt.contains("key_findings"));
    }

    #[test]
    fn test_analyst_prompt_carries_research() {
        let research = ResearchBrief {
            key_findings: vec!["GCC food delivery is consolidating".to_string()],
            market_context: "Competitive duopoly".to_string(),
            ..ResearchBrief::default()
        };

        let prompt = StagePrompts::analyst(&request(), &research);
        assert!(prompt.contains("GCC food delivery is consolidating"));
        assert!(prompt.contains("Competitive duopoly"));
        assert!(prompt.contains("market_size"));
    }

    #[test]
    fn test_clarification_rendered_when_present() {
        let mut req = request();
        req.clarification = Some(Clarification {
            question: "What is the entry budget?".to_string(),
            answer: "Up to $200M".to_string(),
        });

        let prompt = StagePrompts::regulatory(&req, &ResearchBrief::default());
        assert!(prompt.contains("What is the entry budget?"));
        assert!(prompt.contains("Up to $200M"));
    }

    #[test]
    fn test_synthesis_prompt_includes_all_inputs() {
        let research = ResearchBrief::default();
        let analysis = MarketAssessment {
            revenue_outlook: "Breakeven in year three".to_string(),
            ..MarketAssessment::default()
        };
        let regulatory = RegulatoryAssessment {
            key_blockers: vec!["Foreign ownership cap".to_string()],
            ..RegulatoryAssessment::default()
        };

        let prompt = StagePrompts::synthesis(&request(), &research, &analysis, &regulatory);
        assert!(prompt.contains("Breakeven in year three"));
        assert!(prompt.contains("Foreign ownership cap"));
        assert!(prompt.contains("verdict"));
    }

    #[test]
    fn test_clarify_prompt_asks_for_one_question() {
        let prompt = StagePrompts::clarify(&request());
        assert!(prompt.contains("clarifying question"));
        assert!(prompt.contains("Zomato"));
    }
}
