//! Report rendering stage — turns the final state into shareable artifacts.
//!
//! Produces an HTML report and a plain-text twin. Runs last and is always
//! optional: a rendering failure leaves the report fields absent and the
//! pipeline still completes. Artifacts are persisted to the results cache by
//! the HTTP boundary, never read by other stages.

use chrono::Utc;
use std::fmt::Write as _;

use crate::pipeline::stage::{StageError, StageResult};
use crate::pipeline::state::AnalysisState;

/// Rendered report bodies, applied to the state's report fields.
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub html: String,
    pub text: String,
}

impl ReportArtifacts {
    pub fn apply(self, state: &mut AnalysisState) {
        state.html_report = Some(self.html);
        state.text_report = Some(self.text);
    }
}

pub fn render(state: &AnalysisState) -> StageResult<ReportArtifacts> {
    if state.job_title.is_empty() && state.match_score == 0.0 && state.matched_skills.is_empty() {
        return Err(StageError::Recoverable(
            "Report rendering skipped: no analysis content to render".to_string(),
        ));
    }

    Ok(ReportArtifacts {
        html: render_html(state),
        text: render_text(state),
    })
}

fn render_html(state: &AnalysisState) -> String {
    let generated = Utc::now().format("%Y-%m-%d %H:%M UTC");
    let mut out = String::with_capacity(4096);

    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Resume Analysis Report</title>
<style>
  body {{ font-family: Helvetica, Arial, sans-serif; max-width: 760px; margin: 2rem auto; color: #1f2937; }}
  h1 {{ color: #1e3a8a; }}
  h2 {{ color: #2563eb; border-bottom: 1px solid #e5e7eb; padding-bottom: 0.25rem; }}
  .score {{ font-size: 2.5rem; font-weight: bold; color: #1e3a8a; }}
  .muted {{ color: #6b7280; font-size: 0.85rem; }}
  li {{ margin-bottom: 0.3rem; }}
</style>
</head>
<body>
<h1>Resume Analysis Report</h1>
<p class="muted">Analysis {id} &middot; generated {generated}</p>
<h2>Match Score</h2>
<p class="score">{score:.2}%</p>
<p>{title}{position}</p>
"#,
        id = state.id,
        score = state.match_score,
        title = escape(&state.job_title),
        position = if state.position_type.is_empty() || state.position_type == "Unknown" {
            String::new()
        } else {
            format!(" &middot; {}", escape(&state.position_type))
        },
    );

    push_list_section(&mut out, "Matched Skills", state.matched_skills.iter());
    push_list_section(&mut out, "Missing Skills", state.missing_skills.iter());
    push_list_section(&mut out, "ATS Recommendations", state.ats_recommendations.iter());
    push_list_section(&mut out, "Career Advice", state.career_advice.iter());
    push_list_section(
        &mut out,
        "Improvement Suggestions",
        state.improvement_suggestions.iter(),
    );

    if !state.interview_questions.is_empty() {
        out.push_str("<h2>Likely Interview Questions</h2>\n<ol>\n");
        for q in &state.interview_questions {
            let _ = write!(
                out,
                "<li><strong>{}</strong><br>Why: {}<br>Tip: {}</li>\n",
                escape(&q.question),
                escape(&q.why),
                escape(&q.tip)
            );
        }
        out.push_str("</ol>\n");
    }

    if !state.tailored_resume_suggestions.is_empty() {
        out.push_str("<h2>Tailoring Suggestions</h2>\n<ul>\n");
        for s in &state.tailored_resume_suggestions {
            let _ = write!(
                out,
                "<li><strong>{}</strong>: {} <span class=\"muted\">({})</span></li>\n",
                escape(&s.section),
                escape(&s.change),
                escape(&s.reason)
            );
        }
        out.push_str("</ul>\n");
    }

    if !state.company_intel.is_empty() {
        let _ = write!(
            out,
            "<h2>Company Intel: {}</h2>\n",
            escape(&state.company_intel.company_name)
        );
        push_list_section(&mut out, "Recent Tech", state.company_intel.recent_tech.iter());
        push_list_section(
            &mut out,
            "Talking Points",
            state.company_intel.talking_points.iter(),
        );
        if !state.company_intel.culture_notes.is_empty() {
            let _ = write!(out, "<p>{}</p>\n", escape(&state.company_intel.culture_notes));
        }
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_text(state: &AnalysisState) -> String {
    let mut out = String::with_capacity(2048);

    let _ = writeln!(out, "RESUME ANALYSIS REPORT ({})", state.id);
    let _ = writeln!(out, "Match score: {:.2}%", state.match_score);
    if !state.job_title.is_empty() {
        let _ = writeln!(out, "Role: {}", state.job_title);
    }

    push_text_section(&mut out, "Matched skills", state.matched_skills.iter());
    push_text_section(&mut out, "Missing skills", state.missing_skills.iter());
    push_text_section(&mut out, "ATS recommendations", state.ats_recommendations.iter());
    push_text_section(&mut out, "Career advice", state.career_advice.iter());
    push_text_section(
        &mut out,
        "Improvement suggestions",
        state.improvement_suggestions.iter(),
    );

    if !state.interview_questions.is_empty() {
        let _ = writeln!(out, "\nLikely interview questions:");
        for (i, q) in state.interview_questions.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, q.question);
            let _ = writeln!(out, "   Why: {}", q.why);
            let _ = writeln!(out, "   Tip: {}", q.tip);
        }
    }

    out
}

fn push_list_section<'a>(out: &mut String, title: &str, items: impl Iterator<Item = &'a String>) {
    let items: Vec<&String> = items.collect();
    if items.is_empty() {
        return;
    }
    let _ = write!(out, "<h2>{}</h2>\n<ul>\n", escape(title));
    for item in items {
        let _ = write!(out, "<li>{}</li>\n", escape(item));
    }
    out.push_str("</ul>\n");
}

fn push_text_section<'a>(out: &mut String, title: &str, items: impl Iterator<Item = &'a String>) {
    let items: Vec<&String> = items.collect();
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}:");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::state::{AnalysisInput, InterviewQuestion};
    use bytes::Bytes;

    fn analyzed_state() -> AnalysisState {
        let mut state = AnalysisState::new(AnalysisInput {
            resume_file: Bytes::from_static(b"x"),
            resume_filename: "r.pdf".to_string(),
            job_description: "jd".to_string(),
            job_url: None,
            company_name: None,
        });
        state.job_title = "Senior Engineer <Platform>".to_string();
        state.match_score = 68.0;
        state.matched_skills = ["python".to_string()].into_iter().collect();
        state.missing_skills = ["kubernetes".to_string()].into_iter().collect();
        state.interview_questions = vec![InterviewQuestion {
            question: "Q1".to_string(),
            why: "W1".to_string(),
            tip: "T1".to_string(),
        }];
        state
    }

    #[test]
    fn renders_both_artifacts_with_score() {
        let artifacts = render(&analyzed_state()).unwrap();
        assert!(artifacts.html.contains("68.00"));
        assert!(artifacts.text.contains("68.00"));
        assert!(artifacts.html.contains("kubernetes"));
        assert!(artifacts.text.contains("Q1"));
    }

    #[test]
    fn html_escapes_user_controlled_text() {
        let artifacts = render(&analyzed_state()).unwrap();
        assert!(artifacts.html.contains("Senior Engineer &lt;Platform&gt;"));
        assert!(!artifacts.html.contains("<Platform>"));
    }

    #[test]
    fn empty_state_is_a_recoverable_skip() {
        let state = AnalysisState::new(AnalysisInput {
            resume_file: Bytes::from_static(b"x"),
            resume_filename: "r.pdf".to_string(),
            job_description: "jd".to_string(),
            job_url: None,
            company_name: None,
        });
        assert!(matches!(
            render(&state),
            Err(StageError::Recoverable(_))
        ));
    }

    #[test]
    fn apply_sets_report_fields() {
        let mut state = analyzed_state();
        render(&state).unwrap().apply(&mut state);
        assert!(state.html_report.is_some());
        assert!(state.text_report.is_some());
    }
}
