//! Compiled term patterns
//!
//! - Substring: memchr `Finder` over ASCII case-folded bytes, offsets preserved
//! - WholeWord / Regex: `regex::Regex`

use crate::kernel::services::ports::{MatchOptions, MatchRule, Occurrence, SearchKind, SearchScope};
use memchr::memmem::Finder;

const PREVIEW_BEFORE: usize = 40;
const PREVIEW_AFTER: usize = 80;

pub enum TermPattern {
    Literal {
        needle: Vec<u8>,
        case_sensitive: bool,
        rule: MatchRule,
        finder: Finder<'static>,
    },
    Regex {
        regex: regex::Regex,
    },
}

impl TermPattern {
    pub fn literal(term: &str, case_sensitive: bool, rule: MatchRule) -> Self {
        let needle = if case_sensitive {
            term.as_bytes().to_vec()
        } else {
            term.to_ascii_lowercase().into_bytes()
        };
        let finder = Finder::new(&needle).into_owned();
        Self::Literal {
            needle,
            case_sensitive,
            rule,
            finder,
        }
    }

    pub fn compile(term: &str, options: &MatchOptions) -> Result<Self, regex::Error> {
        let case_sensitive = options.is_case_sensitive();
        let rule = options.rule.unwrap_or(MatchRule::Contains);
        let pattern = match options.kind {
            SearchKind::Substring => return Ok(Self::literal(term, case_sensitive, rule)),
            SearchKind::WholeWord => {
                let word = format!(r"\b{}\b", regex::escape(term));
                match rule {
                    MatchRule::Contains => word,
                    MatchRule::BeginsWith => format!(r"\A{}", word),
                    MatchRule::EndsWith => format!(r"{}\z", word),
                }
            }
            SearchKind::Regex => term.to_string(),
        };
        let regex = regex::RegexBuilder::new(&pattern)
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self::Regex { regex })
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Self::Regex { .. })
    }

    /// Non-empty match ranges in ascending order, at most `limit`.
    pub fn find_all(&self, haystack: &str, limit: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        if limit == 0 {
            return out;
        }
        match self {
            Self::Literal {
                needle,
                case_sensitive,
                rule,
                finder,
            } => {
                if needle.is_empty() || needle.len() > haystack.len() {
                    return out;
                }
                let folded;
                let bytes = if *case_sensitive {
                    haystack.as_bytes()
                } else {
                    folded = haystack.to_ascii_lowercase();
                    folded.as_bytes()
                };
                match rule {
                    MatchRule::Contains => {
                        for start in finder.find_iter(bytes) {
                            out.push((start, start + needle.len()));
                            if out.len() >= limit {
                                break;
                            }
                        }
                    }
                    MatchRule::BeginsWith => {
                        if bytes.starts_with(needle) {
                            out.push((0, needle.len()));
                        }
                    }
                    MatchRule::EndsWith => {
                        if bytes.ends_with(needle) {
                            out.push((bytes.len() - needle.len(), bytes.len()));
                        }
                    }
                }
            }
            Self::Regex { regex } => {
                for mat in regex.find_iter(haystack) {
                    if mat.start() == mat.end() {
                        continue;
                    }
                    out.push((mat.start(), mat.end()));
                    if out.len() >= limit {
                        break;
                    }
                }
            }
        }
        out
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        !self.find_all(haystack, 1).is_empty()
    }
}

/// Turns ascending match ranges over `text` into occurrences with line
/// numbers and a short preview of the surrounding line.
pub fn occurrences_in(
    scope: SearchScope,
    text: &str,
    ranges: &[(usize, usize)],
) -> Vec<Occurrence> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(ranges.len());
    let mut current_line = 0usize;
    let mut line_start = 0usize;
    let mut last_pos = 0usize;

    for &(start, end) in ranges {
        if start < last_pos {
            // Ranges from several terms are merged by the caller; recount.
            current_line = 0;
            line_start = 0;
            last_pos = 0;
        }
        let newlines = memchr::memchr_iter(b'\n', &bytes[last_pos..start]).count();
        if newlines > 0 {
            current_line += newlines;
            if let Some(pos) = memchr::memrchr(b'\n', &bytes[last_pos..start]) {
                line_start = last_pos + pos + 1;
            }
        }
        last_pos = start;

        let line_end = memchr::memchr(b'\n', &bytes[end..])
            .map(|pos| end + pos)
            .unwrap_or(bytes.len());
        out.push(Occurrence {
            scope,
            line: current_line,
            start,
            end,
            preview: preview(text, line_start, line_end, start, end),
        });
    }

    out
}

fn preview(text: &str, line_start: usize, line_end: usize, start: usize, end: usize) -> String {
    let mut from = start.saturating_sub(PREVIEW_BEFORE).max(line_start);
    let mut to = (end + PREVIEW_AFTER).min(line_end).max(end);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    while !text.is_char_boundary(to) {
        to += 1;
    }
    let mut s = String::with_capacity(to - from + 2);
    if from > line_start {
        s.push('…');
    }
    s.push_str(text[from..to].trim_end_matches('\r'));
    if to < line_end {
        s.push('…');
    }
    s
}
