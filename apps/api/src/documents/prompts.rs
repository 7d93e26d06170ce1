// Proposal and slide-deck prompt templates.

/// Replace `{problem}`, `{solution}`, `{rationale}`, `{keywords}` and
/// `{program}` before sending.
pub const PROPOSAL_PROMPT_TEMPLATE: &str = r#"Draft an application for the support program below, based on the business analysis.

TARGET PROGRAM:
{program}

ANALYSIS:
- Problem: {problem}
- Solution: {solution}
- Rationale: {rationale}
- Keywords: {keywords}

Structure the draft with these sections:
1. Company and problem overview
2. Proposed solution and differentiation
3. Execution plan and milestones
4. Expected outcomes
5. Budget usage outline

Keep it under 1,200 words. Write in Korean."#;

/// Replace `{proposal}` and `{slide_count}` before sending.
pub const SLIDES_PROMPT_TEMPLATE: &str = r#"Turn the following proposal into a pitch-deck outline of {slide_count} slides.

PROPOSAL:
{proposal}

Return ONLY this JSON object:
{"slides": [{"title": "slide title", "bullets": ["point", "point"], "speaker_notes": "one or two sentences"}]}"#;
