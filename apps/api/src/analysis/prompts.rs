/// Longest résumé excerpt sent to the model.
pub const MAX_PROMPT_CHARS: usize = 12_000;

pub const ATS_REVIEW_SYSTEM: &str = "You are an experienced recruiter who knows how applicant \
    tracking systems parse résumés. Judge only what is in the text you are given. \
    Do not invent employers, dates or skills.";

pub const ATS_REVIEW_PROMPT_TEMPLATE: &str = r#"Review the following résumé text, extracted from the uploaded file, for how well an applicant tracking system could parse and rank it.

Return JSON with exactly these fields:
{
  "overall_score": <0-100>,
  "format_score": <0-100, layout and structure as an ATS sees it>,
  "keyword_score": <0-100, relevant skills and role keywords>,
  "contact_score": <0-100, completeness and placement of contact details>,
  "content_score": <0-100, clarity, bullets and quantified impact>,
  "critical_issues": [<short strings>],
  "warnings": [<short strings>],
  "suggestions": [<up to 5 short, concrete improvements>]
}

RÉSUMÉ TEXT:
{resume_text}"#;

pub fn build_ats_review_prompt(resume_text: &str) -> String {
    ATS_REVIEW_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_text() {
        let prompt = build_ats_review_prompt("Jane Doe\nEngineer");
        assert!(prompt.ends_with("Jane Doe\nEngineer"));
        assert!(prompt.contains("\"keyword_score\""));
    }
}
