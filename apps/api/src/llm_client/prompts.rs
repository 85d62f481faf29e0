// Shared prompt fragments.
// Each service that talks to the LLM keeps its own prompts.rs alongside it and
// pulls cross-cutting constraints from here.

/// Forbids markup so the reply can be laid out line by line.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
    Output PLAIN TEXT ONLY. Do NOT use markdown, asterisks for bold, '#' headings, \
    tables, code fences or HTML. Use '•' for bullets and '|' to separate title, \
    company and location on one line.";

/// Forbids invented content.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Do NOT invent employers, job titles, dates, degrees, certifications, \
    metrics or skills. Keep the candidate's name, company names and dates EXACTLY \
    as they appear in the source resume. If the resume does not support a claim, omit it.";
