// Proposal analysis prompt templates.

/// Analysis prompt template. Replace `{proposal_text}` before sending.
pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"Analyse the following business proposal for a company seeking government support.

PROPOSAL:
{proposal_text}

Break it down as follows:
- problem: the core problem the company faces today
- solution: how the company proposes to solve it
- rationale: why that solution is likely to work
- keywords: 3 to 8 short terms describing the industry, technology and kind of support needed
- category: one of "창업", "R&D", "제조혁신", "수출", "디지털전환", "경영혁신", "소상공인"

Return ONLY this JSON object:
{"problem": "...", "solution": "...", "rationale": "...", "keywords": ["..."], "category": "..."}"#;
