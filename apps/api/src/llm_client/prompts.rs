// Shared prompt constants.
// Each feature module that calls the LLM defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant \
    specialised in Korean public business-support programs. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for free-form drafting (proposals).
pub const DRAFTING_SYSTEM: &str = "You are an experienced grant consultant who writes \
    clear, persuasive applications for government business-support programs. \
    Write in plain prose with short headed sections. Never invent figures \
    that are not present in the supplied analysis.";

/// Substitutes `{name}` placeholders in one pass over `template`.
///
/// Inserted values are never rescanned, so caller text containing a
/// placeholder is sent verbatim. Braces that do not name a known value
/// (e.g. JSON examples in the template) are left untouched.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });
        match hit {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
