// Ranking prompt template.

/// Replace `{problem}`, `{solution}`, `{rationale}`, `{keywords}`,
/// `{category}` and `{programs}` before sending.
pub const RANKING_PROMPT_TEMPLATE: &str = r#"Recommend the 3 support programs that best fit the business analysis below.

ANALYSIS:
- Problem: {problem}
- Solution: {solution}
- Rationale: {rationale}
- Keywords: {keywords}
- Category: {category}

CURRENTLY OPEN PROGRAMS (name | agency | target | region | period):
{programs}

RULES:
1. Only recommend programs from the list above. Copy the program name exactly.
2. fit_score is an integer from 0 to 100.
3. reason is one or two sentences tying the program to the analysis.

Return ONLY a JSON array:
[
  {"name": "program name", "agency": "agency", "reason": "why it fits", "fit_score": 95}
]"#;
