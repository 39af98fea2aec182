//! Deterministic skill extraction against a curated dictionary.
//!
//! This is intentionally a lookup, not NLP: it never fails, never calls out,
//! and always returns the same set for the same text. LLM-based enrichment
//! happens in the resume parser and is unioned with (never replaces) this.

use regex::Regex;
use std::collections::BTreeSet;

/// Known technical skills, lowercase. Multi-word entries are matched as
/// adjacent token pairs.
pub const SKILL_DICTIONARY: &[&str] = &[
    // Programming languages
    "python", "java", "javascript", "typescript", "c++", "c#", "c", "ruby", "php", "go", "golang",
    "rust", "swift", "kotlin", "scala", "r", "perl", "bash", "shell",
    // Frontend
    "react", "reactjs", "angular", "vue", "vuejs", "svelte", "nextjs", "nuxt", "html", "html5",
    "css", "css3", "sass", "scss", "tailwind", "bootstrap", "jquery", "webpack", "vite",
    // Backend
    "node", "nodejs", "express", "django", "flask", "fastapi", "spring", "spring boot", "laravel",
    "rails", "asp.net", ".net", "nestjs",
    // Databases
    "sql", "nosql", "mysql", "postgresql", "postgres", "mongodb", "redis", "elasticsearch",
    "cassandra", "oracle", "dynamodb", "sqlite", "firebase",
    // Cloud & DevOps
    "aws", "azure", "gcp", "google cloud", "docker", "kubernetes", "k8s", "jenkins", "terraform",
    "ansible", "ci/cd", "devops", "git", "github", "gitlab",
    // Data science & ML
    "machine learning", "deep learning", "nlp", "computer vision", "ai", "tensorflow", "pytorch",
    "keras", "scikit-learn", "pandas", "numpy", "spark", "hadoop", "kafka",
    // Testing
    "jest", "pytest", "selenium", "cypress", "junit",
    // Other
    "rest api", "graphql", "microservices", "agile", "scrum", "jira", "linux", "unix", "nginx",
    "apache",
];

/// Extracts dictionary skills present in `text`, case-normalized.
///
/// Tokens keep `+ # . / -` so entries like `c++`, `c#`, `.net` and `ci/cd`
/// survive tokenization. Returns a sorted set, so downstream truncation and
/// set algebra are deterministic.
pub fn extract_skills(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    let token_re = Regex::new(r"[a-z0-9+#./-]+").expect("static token pattern");

    let tokens: Vec<&str> = token_re.find_iter(&lowered).map(|m| m.as_str()).collect();

    let words: BTreeSet<&str> = tokens.iter().copied().collect();
    let pairs: BTreeSet<String> = tokens.windows(2).map(|w| w.join(" ")).collect();

    SKILL_DICTIONARY
        .iter()
        .filter(|skill| {
            if skill.contains(' ') {
                pairs.contains(**skill)
            } else {
                words.contains(**skill)
            }
        })
        .map(|skill| skill.to_string())
        .collect()
}

/// Lowercases and trims a caller-supplied skill list into the same shape
/// `extract_skills` produces.
pub fn normalize_skills<I, S>(skills: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    skills
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_single_word_skills_case_insensitively() {
        let found = extract_skills("Built services in Python on AWS, deployed with Docker.");
        assert!(found.contains("python"));
        assert!(found.contains("aws"));
        assert!(found.contains("docker"));
    }

    #[test]
    fn finds_multi_word_skills() {
        let found = extract_skills("Shipped Spring Boot services and machine learning pipelines.");
        assert!(found.contains("spring boot"));
        assert!(found.contains("machine learning"));
        // The single-word component also matches on its own.
        assert!(found.contains("spring"));
    }

    #[test]
    fn finds_punctuated_skills() {
        let found = extract_skills("Comfortable with C++, C# and .NET; set up CI/CD everywhere.");
        assert!(found.contains("c++"));
        assert!(found.contains("c#"));
        assert!(found.contains(".net"));
        assert!(found.contains("ci/cd"));
    }

    #[test]
    fn does_not_match_substrings_of_words() {
        // "scalability" must not match "scala", "gossip" must not match "go".
        let found = extract_skills("Focused on scalability and gossip protocols.");
        assert!(!found.contains("scala"));
        assert!(!found.contains("go"));
    }

    #[test]
    fn empty_text_yields_empty_set() {
        assert!(extract_skills("").is_empty());
    }

    #[test]
    fn normalize_lowercases_and_drops_blanks() {
        let normalized = normalize_skills(vec!["  Python ", "AWS", "", "aws"]);
        assert_eq!(
            normalized.into_iter().collect::<Vec<_>>(),
            vec!["aws".to_string(), "python".to_string()]
        );
    }
}
