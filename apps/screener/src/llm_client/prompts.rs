// Cross-cutting prompt fragments.
// Each agent that needs LLM calls defines its own prompts alongside it.

/// Appended to every agent system prompt by `complete_json`.
pub const JSON_ONLY_REMINDER: &str = "Respond ONLY with valid JSON. No extra text.";

/// Appended to every structured prompt by `complete_json`.
pub const JSON_OUTPUT_SUFFIX: &str = "Output the result as a valid JSON object.";
