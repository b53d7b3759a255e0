//! Pure question-to-intent extraction.
//!
//! `extract` maps a free-text question to a `QueryIntent` with no I/O and
//! no failure mode: an unparseable question yields a mostly-empty intent,
//! never an error. All heuristics are driven by the ordered tables in
//! [`rules`]; extraction is first-match-wins throughout.

pub mod rules;

use chrono::Datelike;
use datamatch_core::types::QueryIntent;
use rules::{
    ideographic_runs, location_patterns, time_patterns, TimeKind, DOMAIN_RULES,
    QUERY_TYPE_RULES, STOPWORDS,
};
use std::collections::HashSet;

/// Extract intent signals from `question`, normalizing relative time
/// expressions against the current date.
pub fn extract(question: &str) -> QueryIntent {
    extract_at(question, chrono::Local::now().year())
}

/// Deterministic variant of [`extract`] with an explicit "current year",
/// used to pin down relative expressions like 去年 in tests.
pub fn extract_at(question: &str, current_year: i32) -> QueryIntent {
    let mut pool = KeywordPool::default();

    let mut domain = None;
    for (candidate, keywords) in DOMAIN_RULES {
        let matched: Vec<&str> = keywords
            .iter()
            .copied()
            .filter(|kw| question.contains(kw))
            .collect();
        if !matched.is_empty() {
            domain = Some(*candidate);
            for kw in matched {
                pool.push(kw);
            }
            break;
        }
    }

    let (location, location_spans) = extract_location(question);
    for span in &location_spans {
        pool.push(span);
    }

    let time = extract_time(question, current_year);
    if let Some(time) = &time {
        pool.push(&time.normalized);
    }

    let query_type = QUERY_TYPE_RULES
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|p| question.contains(p)))
        .map(|(kind, _)| *kind);

    let subject = extract_subject(
        question,
        &location_spans,
        time.as_ref().map(|t| t.raw.as_str()),
    );

    for run in ideographic_runs(question) {
        if run.chars().count() > 1 && !STOPWORDS.contains(&run.as_str()) {
            pool.push(&run);
        }
    }

    QueryIntent {
        keywords: pool.into_vec(),
        domain,
        location,
        time_range: time.map(|t| t.normalized),
        query_type,
        subject,
    }
}

/// Insertion-ordered, deduplicated keyword accumulator.
#[derive(Default)]
struct KeywordPool {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl KeywordPool {
    fn push(&mut self, keyword: &str) {
        if self.seen.insert(keyword.to_string()) {
            self.ordered.push(keyword.to_string());
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

/// All administrative-unit spans found in the question, plus the single
/// "main" location: a district-suffixed span beats a municipality-suffixed
/// span, which beats the first span found.
fn extract_location(question: &str) -> (Option<String>, Vec<String>) {
    let mut spans: Vec<String> = Vec::new();
    for (_, pattern) in location_patterns() {
        for m in pattern.find_iter(question) {
            let span = m.as_str().to_string();
            if !spans.contains(&span) {
                spans.push(span);
            }
        }
    }

    let main = spans
        .iter()
        .find(|s| s.ends_with('区'))
        .or_else(|| spans.iter().find(|s| s.ends_with('市')))
        .or_else(|| spans.first())
        .cloned();

    (main, spans)
}

struct TimeMatch {
    /// Literal span as written in the question.
    raw: String,
    /// Canonical "<year>年" form.
    normalized: String,
}

fn extract_time(question: &str, current_year: i32) -> Option<TimeMatch> {
    for (kind, pattern) in time_patterns() {
        let Some(caps) = pattern.captures(question) else {
            continue;
        };
        let raw = caps.get(0).map(|m| m.as_str().to_string())?;
        let year = match kind {
            TimeKind::ExplicitYear
            | TimeKind::BareYear
            | TimeKind::Range
            | TimeKind::FiscalYear
            | TimeKind::HalfYear
            | TimeKind::Quarter => caps.get(1)?.as_str().parse::<i32>().ok()?,
            TimeKind::Relative => match raw.as_str() {
                "今年" => current_year,
                "去年" => current_year - 1,
                _ => current_year - 2,
            },
            TimeKind::YearsAgoOrLater => {
                let offset = caps.get(1)?.as_str().parse::<i32>().ok()?;
                if caps.get(2)?.as_str() == "前" {
                    current_year - offset
                } else {
                    current_year + offset
                }
            }
        };
        return Some(TimeMatch {
            raw,
            normalized: format!("{}年", year),
        });
    }
    None
}

/// Segment preceding the final 的, with already-extracted location/time
/// spans stripped out; kept only when longer than one character.
fn extract_subject(
    question: &str,
    location_spans: &[String],
    raw_time: Option<&str>,
) -> Option<String> {
    let idx = question.rfind('的')?;
    let mut prefix = question[..idx].to_string();
    for span in location_spans {
        prefix = prefix.replace(span.as_str(), "");
    }
    if let Some(raw) = raw_time {
        prefix = prefix.replace(raw, "");
    }
    let prefix = prefix.trim().to_string();
    (prefix.chars().count() > 1).then_some(prefix)
}
