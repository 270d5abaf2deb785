// Content optimization prompt templates.

pub const OPTIMIZE_SYSTEM: &str = "\
You are an experienced career coach reviewing a public professional profile. \
You MUST respond with valid JSON only. No markdown fences, no explanations. \
Judge only what is present in the profile. Never invent employers, dates or achievements.";

pub const OPTIMIZE_PROMPT: &str = r#"Review the following profile and score how well it presents the person to recruiters and hiring managers.

PROFILE:
{profile_json}

Consider: clarity of the headline, specificity of the bio, measurable results in the work history,
evidence in projects, and whether the links let a reader verify the claims.

OUTPUT SCHEMA (return exactly this structure):
{
  "score": 0-100,
  "summary": "one or two sentences",
  "suggestions": [
    { "field": "headline" | "bio" | "work_history" | "projects" | "links" | "seo", "suggestion": "string", "priority": "high" | "medium" | "low" }
  ]
}

Return at most 6 suggestions, highest priority first."#;

pub fn build_optimize_prompt(profile_json: &str) -> String {
    OPTIMIZE_PROMPT.replace("{profile_json}", profile_json)
}
