//! Field validators — pure checks and extractors over candidate free text.
//!
//! Nothing here fails: every function is total over string input and signals
//! "no match" through its return value.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum characters kept from a single candidate message.
pub const MAX_INPUT_CHARS: usize = 2000;
/// Maximum technologies returned by `parse_tech_stack`.
pub const MAX_TECHNOLOGIES: usize = 15;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9_.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});
static PHONE_SEPARATORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-.()]").expect("valid separator regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("valid phone regex"));
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static TECH_SEPARATORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;/\n]").expect("valid separator regex"));

/// Spelled-out experience answers, checked in order on word boundaries.
const EXPERIENCE_WORDS: &[(&str, f64)] = &[
    ("fresher", 0.0),
    ("fresh", 0.0),
    ("no experience", 0.0),
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
];

static EXPERIENCE_WORD_RES: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    EXPERIENCE_WORDS
        .iter()
        .map(|(word, years)| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word)))
                .expect("valid experience word regex");
            (re, *years)
        })
        .collect()
});

/// Known technologies in their canonical display form.
const KNOWN_TECHNOLOGIES: &[&str] = &[
    // Languages
    "Python", "Java", "JavaScript", "TypeScript", "C++", "C#", "Ruby", "Go", "Rust", "PHP",
    "Swift", "Kotlin", "Scala", "R", "MATLAB", "Perl",
    // Frontend
    "React", "Angular", "Vue", "Svelte", "Next.js", "Nuxt", "HTML", "CSS", "Sass", "Less",
    "Tailwind", "Bootstrap", "jQuery", "Redux",
    // Backend
    "Django", "Flask", "FastAPI", "Spring", "Node.js", "Express", "Rails", "Laravel",
    "ASP.NET", ".NET", "GraphQL", "REST", "gRPC",
    // Databases
    "MySQL", "PostgreSQL", "MongoDB", "Redis", "Elasticsearch", "SQLite", "Oracle",
    "SQL Server", "DynamoDB", "Cassandra", "Neo4j", "Firebase",
    // Cloud & DevOps
    "AWS", "Azure", "GCP", "Docker", "Kubernetes", "Jenkins", "Terraform", "Ansible",
    "GitLab", "GitHub Actions", "CircleCI", "Linux",
    // ML/AI
    "TensorFlow", "PyTorch", "Keras", "Scikit-Learn", "Pandas", "NumPy", "OpenCV", "NLTK",
    "spaCy", "Hugging Face", "LangChain",
    // Mobile
    "React Native", "Flutter", "Android", "iOS", "Xamarin",
    // Tools
    "Git", "Jira", "Confluence", "Figma", "Postman", "Swagger",
];

/// Checks `local@domain.tld` shape. No DNS/MX lookup.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Accepts 10–15 digits with an optional leading `+`, ignoring spaces,
/// dashes, dots and parentheses.
pub fn validate_phone(phone: &str) -> bool {
    let cleaned = PHONE_SEPARATORS_RE.replace_all(phone, "");
    PHONE_RE.is_match(&cleaned)
}

/// Extracts years of experience from a free-text answer.
///
/// The first number in the text wins; otherwise a small spelled-out
/// vocabulary is tried. `None` means the caller should keep the raw text.
pub fn validate_experience(experience: &str) -> Option<f64> {
    if let Some(m) = NUMBER_RE.find(experience) {
        return m.as_str().parse().ok();
    }

    EXPERIENCE_WORD_RES
        .iter()
        .find(|(re, _)| re.is_match(experience))
        .map(|(_, years)| *years)
}

/// Positions where `needle` occurs in `haystack` with no word character glued
/// to either side. Both arguments are expected lowercase.
fn token_matches<'a>(haystack: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    let is_word = |c: char| c.is_alphanumeric() || c == '+' || c == '#' || c == '_';
    haystack.match_indices(needle).map(|(i, _)| i).filter(move |&i| {
        let before_ok = haystack[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word(c) && c != '.');
        let after_ok = haystack[i + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word(c));
        before_ok && after_ok
    })
}

/// Extracts the technologies a candidate mentions.
///
/// Vocabulary matches come first, ordered by where they appear in the text.
/// Separator-delimited tokens that are not already covered are appended
/// verbatim. At most `MAX_TECHNOLOGIES` entries are returned.
pub fn parse_tech_stack(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let needles: Vec<String> = KNOWN_TECHNOLOGIES.iter().map(|t| t.to_lowercase()).collect();

    // Every vocabulary hit as a byte span, so "React" inside "React Native" can be skipped
    let spans: Vec<(usize, usize)> = needles
        .iter()
        .flat_map(|n| token_matches(&lower, n).map(move |i| (i, i + n.len())))
        .collect();
    let inside_longer = |start: usize, end: usize| {
        spans
            .iter()
            .any(|&(s, e)| s <= start && end <= e && e - s > end - start)
    };

    let mut matches: Vec<(usize, &str)> = KNOWN_TECHNOLOGIES
        .iter()
        .zip(&needles)
        .filter_map(|(tech, needle)| {
            token_matches(&lower, needle)
                .find(|&i| !inside_longer(i, i + needle.len()))
                .map(|pos| (pos, *tech))
        })
        .collect();
    matches.sort_by_key(|(pos, _)| *pos);

    let mut identified: Vec<String> = matches.iter().map(|(_, t)| t.to_string()).collect();

    for token in TECH_SEPARATORS_RE.split(text) {
        let token = token.trim();
        if token.chars().count() <= 1 {
            continue;
        }
        let token_lower = token.to_lowercase();
        let duplicate = identified.iter().any(|t| t.to_lowercase() == token_lower);
        let covered = needles
            .iter()
            .any(|needle| token_matches(&token_lower, needle).next().is_some());
        if !duplicate && !covered {
            identified.push(token.to_string());
        }
    }

    identified.truncate(MAX_TECHNOLOGIES);
    identified
}

/// Cleans a raw candidate message: strips tag-like `<...>` substrings,
/// then collapses whitespace and caps the length.
pub fn sanitize_input(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, "");
    let collapsed = without_tags.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_INPUT_CHARS).collect()
}
