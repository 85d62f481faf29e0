//! Optimization prompt template and builder.

use crate::llm_client::prompts::{NO_FABRICATION_INSTRUCTION, PLAIN_TEXT_INSTRUCTION};
use crate::optimizer::policy::PromptBounds;

/// Optimization prompt. Replace every `{placeholder}` before sending.
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = "\
You are an expert ATS (Applicant Tracking System) resume optimizer.\n\
Rewrite the candidate's resume so it maximizes keyword match against the job description \
while staying truthful.\n\
\n\
STRICT CONSTRAINTS:\n\
1. {no_fabrication}\n\
2. Target length: {page_target} page(s).\n\
3. Each role gets between {min_bullets} and {max_bullets} bullets, most relevant first.\n\
4. Use exactly these section headers, in this order, in UPPERCASE on their own line \
(omit a section only if the resume has no content for it): {section_order}.\n\
5. Line 1 is the candidate's full name. Line 2 is the contact line with segments \
separated by ' | '.\n\
6. Each role header is one line: Title | Company | Location (Mon YYYY - Mon YYYY or Present).\n\
7. Skills are grouped one category per line as 'Category: item, item, item'.\n\
8. {plain_text}\n\
{score_instruction}\
\n\
RESUME:\n\
{resume_text}\n\
\n\
JOB DESCRIPTION:\n\
{job_description}\n\
\n\
Return only the rewritten resume.";

/// Appended constraint when the score marker is requested.
pub const SCORE_MARKER_INSTRUCTION: &str = "\
9. After the resume, on its own final line, write your estimated ATS match score \
as [ATS_SCORE: NN] where NN is 0-100.\n";

/// Builds the single prompt sent to both primary and fallback models.
pub fn build_optimization_prompt(
    resume_text: &str,
    job_description: &str,
    bounds: &PromptBounds,
) -> String {
    let score_instruction = if bounds.emit_score_marker {
        SCORE_MARKER_INSTRUCTION
    } else {
        ""
    };

    OPTIMIZE_PROMPT_TEMPLATE
        .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION.trim())
        .replace("{plain_text}", PLAIN_TEXT_INSTRUCTION.trim())
        .replace("{page_target}", &bounds.page_target.to_string())
        .replace("{min_bullets}", &bounds.min_bullets_per_role.to_string())
        .replace("{max_bullets}", &bounds.max_bullets_per_role.to_string())
        .replace("{section_order}", &bounds.section_order.join(", "))
        .replace("{score_instruction}", score_instruction)
        // Caller text goes in last so braces inside it are never treated as placeholders.
        .replace("{job_description}", job_description.trim())
        .replace("{resume_text}", resume_text.trim())
}
