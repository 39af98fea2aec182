// All LLM prompt constants for the analysis stages.
// Every prompt demands JSON matching the exact schema its stage decodes;
// free-text model output never reaches pipeline logic.

/// System prompt for resume skill enrichment — enforces JSON-only output.
pub const RESUME_PARSE_SYSTEM: &str =
    "You are an expert resume parser. Extract structured information from a resume. \
    Only extract TECHNICAL skills: programming languages, frameworks and libraries, \
    databases, cloud platforms, DevOps tools, and other technical tooling. \
    Never include soft skills (communication, teamwork, leadership), generic terms \
    (experience, knowledge), or platform names (Udemy, Coursera, LinkedIn). \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Resume parsing prompt template. Replace `{resume_text}` before sending.
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"Parse the following resume.

Return a JSON object with this EXACT schema (no extra fields):
{
  "skills": ["python", "aws"],
  "summary": "One concise professional summary sentence.",
  "key_highlights": ["Led migration to Kubernetes across 12 services"]
}

RESUME:
{resume_text}"#;

/// System prompt for job description parsing — enforces JSON-only output.
pub const JOB_PARSE_SYSTEM: &str =
    "You are an expert job description analyst. Extract structured information \
    from a job posting. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// JD parsing prompt template. Replace `{jd_text}` before sending.
pub const JOB_PARSE_PROMPT_TEMPLATE: &str = r#"Parse the following job description.

Return a JSON object with this EXACT schema (no extra fields):
{
  "job_title": "Senior Backend Engineer",
  "position_type": "Full-time",
  "required_skills": ["python", "kubernetes"],
  "required_experience": "5+ years",
  "key_requirements": ["Design and operate distributed services"],
  "nice_to_have": ["Kafka experience"]
}

Rules:
- position_type is one of "Full-time", "Part-time", "Contract", "Internship",
  or "Unknown" when the posting does not say.
- required_skills lists technical skills only, lowercase.
- required_experience is the experience requirement as written, or "" if absent.

JOB DESCRIPTION:
{jd_text}"#;

/// System prompt for the combined ATS + career advice stage.
pub const ADVICE_SYSTEM: &str =
    "You are an expert career consultant and ATS (Applicant Tracking System) \
    specialist. Provide specific, actionable recommendations. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Combined advice prompt template.
/// Replace: {match_score}, {matched_skills}, {missing_skills}, {job_title}
pub const ADVICE_PROMPT_TEMPLATE: &str = r#"Analyze this resume-job match:

Match Score: {match_score}%
Matched Skills: {matched_skills}
Missing Skills: {missing_skills}
Job Title: {job_title}

Return a JSON object with this EXACT schema:
{
  "ats_recommendations": ["..."],
  "career_advice": ["..."],
  "improvement_suggestions": ["..."]
}

Provide up to 5 entries per list. Focus on actionable, specific suggestions
tied to the skills above — not generic advice."#;

/// System prompt for interview preparation.
pub const INTERVIEW_PREP_SYSTEM: &str =
    "You are a senior technical interviewer. Generate realistic interview \
    questions this candidate will likely face, focused on areas where they \
    must demonstrate competence. \
    You MUST respond with valid JSON only — a JSON array. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences.";

/// Interview prep prompt template.
/// Replace: {job_title}, {job_skills}, {resume_skills}, {missing_skills},
///          {match_score}, {company_tech}
pub const INTERVIEW_PREP_PROMPT_TEMPLATE: &str = r#"Job Title: {job_title}
Required Skills: {job_skills}
Candidate's Skills: {resume_skills}
Missing Skills: {missing_skills}
Match Score: {match_score}%
Company Tech (if known): {company_tech}

Generate 5 specific technical interview questions they will likely be asked.

Return a JSON ARRAY with this EXACT element schema:
[
  {
    "question": "How would you design a rate limiter for a public API?",
    "why": "The posting emphasizes high-traffic service design",
    "tip": "Walk through requirements first, then compare token bucket vs sliding window"
  }
]"#;

/// System prompt for resume tailoring suggestions.
pub const RESUME_COACH_SYSTEM: &str =
    "You are an expert resume coach. Analyze the resume against the job \
    description and suggest SPECIFIC, ACTIONABLE edits, referencing concrete \
    sections and exact wording changes. \
    You MUST respond with valid JSON only — a JSON array. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences.";

/// Resume coach prompt template.
/// Replace: {job_title}, {job_requirements}, {job_skills}, {resume_text},
///          {resume_skills}, {missing_skills}, {match_score}
pub const RESUME_COACH_PROMPT_TEMPLATE: &str = r#"Job Title: {job_title}
Job Requirements: {job_requirements}
Required Skills: {job_skills}

Resume Text (excerpt):
{resume_text}

Candidate's Current Skills: {resume_skills}
Missing Skills: {missing_skills}
Match Score: {match_score}%

Provide 5 resume tailoring suggestions.

Return a JSON ARRAY with this EXACT element schema:
[
  {
    "section": "Experience bullet 2",
    "change": "Quantify the Kafka migration: throughput, latency, team size",
    "reason": "The posting repeatedly asks for streaming experience at scale"
  }
]"#;

/// System prompt for company research synthesis.
pub const INVESTIGATOR_SYSTEM: &str =
    "You are a company research analyst helping a candidate prepare for an \
    interview. Synthesize the search results into actionable intelligence. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Company research prompt template.
/// Replace: {company_name}, {search_results}, {job_skills}, {resume_skills}
pub const INVESTIGATOR_PROMPT_TEMPLATE: &str = r#"Company: {company_name}

Search Results:
{search_results}

Job Skills Required: {job_skills}
Candidate Skills: {resume_skills}

Return a JSON object with this EXACT schema:
{
  "recent_tech": ["3-5 specific technologies they use or recently adopted"],
  "talking_points": ["3 specific things the candidate should mention"],
  "culture_notes": "1-2 sentences about engineering culture, or \"\" if unknown"
}"#;
