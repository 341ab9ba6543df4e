//! Search suggestions: default chips when the bar is empty, contextual
//! completions (`host: api`, `status: 5xx`, ...) while typing.

use crate::kernel::services::ports::{
    LogLevel, RecentTokenStore, SearchFilter, SearchScope, SearchToken, StatusRange, Suggestion,
};
use std::sync::Arc;

const HTTP_METHODS: [&str; 7] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];
const STATUS_CLASSES: [u16; 4] = [2, 3, 4, 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterKey {
    Status,
    Host,
    Method,
    Path,
    Level,
    Label,
}

impl FilterKey {
    const ALL: [FilterKey; 6] = [
        FilterKey::Status,
        FilterKey::Host,
        FilterKey::Method,
        FilterKey::Path,
        FilterKey::Level,
        FilterKey::Label,
    ];

    fn name(self) -> &'static str {
        match self {
            FilterKey::Status => "status",
            FilterKey::Host => "host",
            FilterKey::Method => "method",
            FilterKey::Path => "path",
            FilterKey::Level => "level",
            FilterKey::Label => "label",
        }
    }

    fn hint(self) -> &'static str {
        match self {
            FilterKey::Status => "e.g. 500, 4xx, 200-299",
            FilterKey::Host => "e.g. api.example.com",
            FilterKey::Method => "e.g. GET",
            FilterKey::Path => "e.g. /v1/users",
            FilterKey::Level => "e.g. error",
            FilterKey::Label => "e.g. network",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        match name.to_ascii_lowercase().as_str() {
            "status" | "code" | "status-code" => Some(FilterKey::Status),
            "host" | "domain" => Some(FilterKey::Host),
            "method" => Some(FilterKey::Method),
            "path" => Some(FilterKey::Path),
            "level" => Some(FilterKey::Level),
            "label" => Some(FilterKey::Label),
            _ => None,
        }
    }
}

pub struct ConsoleSearchSuggestionsService {
    recents: Arc<dyn RecentTokenStore>,
    limit: usize,
}

impl ConsoleSearchSuggestionsService {
    pub fn new(recents: Arc<dyn RecentTokenStore>, limit: usize) -> Self {
        Self {
            recents,
            limit: limit.max(1),
        }
    }

    pub fn save_recent_token(&self, token: SearchToken) {
        self.recents.save_recent_token(token);
    }

    /// Recent tokens not already applied, topped up with filter templates.
    pub fn default_top_suggestions(&self, current: &[SearchToken]) -> Vec<Suggestion> {
        let mut out: Vec<Suggestion> = self
            .recents
            .recent_tokens()
            .into_iter()
            .filter(|token| !current.contains(token))
            .take(self.limit)
            .map(|token| Suggestion::apply(token).with_subtitle("Recent"))
            .collect();

        for key in FilterKey::ALL {
            if out.len() >= self.limit {
                break;
            }
            out.push(Suggestion::autocomplete(format!("{}: ", key.name())).with_subtitle(key.hint()));
        }
        out
    }

    pub fn default_suggested_scopes(&self) -> Vec<Suggestion> {
        SearchScope::ALL
            .into_iter()
            .map(|scope| Suggestion::apply(SearchToken::Scope(scope)))
            .collect()
    }

    pub fn top_suggestions(
        &self,
        search_text: &str,
        hosts: &[String],
        current: &[SearchToken],
    ) -> Vec<Suggestion> {
        let text = search_text.trim();
        if text.is_empty() {
            return self.default_top_suggestions(current);
        }

        let mut ranked: Vec<(i64, Suggestion)> = Vec::new();
        if let Some((key, value)) = text.split_once(':') {
            if let Some(key) = FilterKey::from_name(key) {
                ranked = value_suggestions(key, value.trim(), hosts);
            }
        } else {
            let query = text.to_ascii_lowercase();
            for key in FilterKey::ALL {
                if let Some(score) = fuzzy_score(key.name(), &query) {
                    ranked.push((
                        score,
                        Suggestion::autocomplete(format!("{}: ", key.name()))
                            .with_subtitle(key.hint()),
                    ));
                }
            }
            for host in hosts {
                if let Some(score) = fuzzy_score(&host.to_ascii_lowercase(), &query) {
                    ranked.push((score, Suggestion::apply(host_token(host))));
                }
            }
            for level in LogLevel::ALL {
                if let Some(score) = fuzzy_score(level.name(), &query) {
                    let token = SearchToken::Filter(SearchFilter::level(level));
                    ranked.push((score, Suggestion::apply(token)));
                }
            }
            for method in HTTP_METHODS {
                if method.eq_ignore_ascii_case(&query) {
                    let token = SearchToken::Filter(SearchFilter::method(method));
                    ranked.push((i64::MAX, Suggestion::apply(token)));
                }
            }
        }

        ranked.retain(|(_, s)| s.token().map_or(true, |token| !current.contains(token)));
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        let mut out: Vec<Suggestion> = ranked.into_iter().map(|(_, s)| s).collect();
        let text_token = SearchToken::Text(text.to_string());
        if !text.contains(':') && !current.contains(&text_token) {
            out.truncate(self.limit.saturating_sub(1));
            out.push(Suggestion::apply(text_token).with_subtitle("Search text"));
        } else {
            out.truncate(self.limit);
        }
        out
    }
}

fn host_token(host: &str) -> SearchToken {
    SearchToken::Filter(SearchFilter::host(host))
}

/// Value completions for `key: value`, best first.
fn value_suggestions(key: FilterKey, value: &str, hosts: &[String]) -> Vec<(i64, Suggestion)> {
    let mut out = Vec::new();
    match key {
        FilterKey::Host => {
            let query = value.to_ascii_lowercase();
            let mut exact = false;
            for (i, host) in hosts.iter().enumerate() {
                let score = if query.is_empty() {
                    Some(-(i as i64))
                } else {
                    fuzzy_score(&host.to_ascii_lowercase(), &query)
                };
                if let Some(score) = score {
                    exact |= host.eq_ignore_ascii_case(value);
                    out.push((score, Suggestion::apply(host_token(host))));
                }
            }
            if !value.is_empty() && !exact {
                out.push((i64::MIN, Suggestion::apply(host_token(value))));
            }
        }
        FilterKey::Status => {
            if value.is_empty() {
                for (i, class) in STATUS_CLASSES.into_iter().enumerate() {
                    let range = StatusRange {
                        start: class * 100,
                        end: class * 100 + 99,
                    };
                    let token = SearchToken::Filter(SearchFilter::status(range));
                    out.push((-(i as i64), Suggestion::apply(token)));
                }
            } else if let Some(range) = parse_status(value) {
                let token = SearchToken::Filter(SearchFilter::status(range));
                out.push((0, Suggestion::apply(token)));
            }
        }
        FilterKey::Method => {
            let upper = value.to_ascii_uppercase();
            for (i, method) in HTTP_METHODS.into_iter().enumerate() {
                if method.starts_with(&upper) {
                    let token = SearchToken::Filter(SearchFilter::method(method));
                    out.push((-(i as i64), Suggestion::apply(token)));
                }
            }
        }
        FilterKey::Level => {
            let lower = value.to_ascii_lowercase();
            for (i, level) in LogLevel::ALL.into_iter().enumerate().rev() {
                if level.name().starts_with(&lower) {
                    let token = SearchToken::Filter(SearchFilter::level(level));
                    out.push((i as i64, Suggestion::apply(token)));
                }
            }
        }
        FilterKey::Path if !value.is_empty() => {
            let token = SearchToken::Filter(SearchFilter::Path {
                values: vec![value.to_string()],
                negated: false,
            });
            out.push((0, Suggestion::apply(token)));
        }
        FilterKey::Label if !value.is_empty() => {
            let token = SearchToken::Filter(SearchFilter::Label {
                values: vec![value.to_string()],
                negated: false,
            });
            out.push((0, Suggestion::apply(token)));
        }
        FilterKey::Path | FilterKey::Label => {}
    }
    out
}

/// Accepts `500`, `5xx`, `5`, and `400-499`.
pub fn parse_status(value: &str) -> Option<StatusRange> {
    let value = value.trim().to_ascii_lowercase();
    if let Some((start, end)) = value.split_once('-') {
        let start = start.trim().parse::<u16>().ok()?;
        let end = end.trim().parse::<u16>().ok()?;
        let valid = (100..=599).contains(&start) && start <= end && end <= 599;
        return valid.then_some(StatusRange { start, end });
    }
    let class_digit = value.strip_suffix("xx").unwrap_or(value.as_str());
    if class_digit.len() == 1 {
        let class = class_digit.parse::<u16>().ok()?;
        return (1..=5).contains(&class).then_some(StatusRange {
            start: class * 100,
            end: class * 100 + 99,
        });
    }
    let code = value.parse::<u16>().ok()?;
    (100..=599).contains(&code).then_some(StatusRange::exact(code))
}

/// Prefix and contiguous matches outrank subsequence matches; `None` when
/// `query` is not a subsequence of `candidate`. Both sides are lowercase.
pub fn fuzzy_score(candidate: &str, query: &str) -> Option<i64> {
    if candidate.is_empty() || query.is_empty() {
        return None;
    }

    if let Some(position) = candidate.find(query) {
        let prefix_bonus = if position == 0 { 400 } else { 0 };
        let compact_bonus = (query.len() as i64) * 40;
        let length_penalty = (candidate.len() as i64 - query.len() as i64).abs();
        return Some(10_000 + prefix_bonus + compact_bonus - position as i64 - length_penalty);
    }

    let mut positions = Vec::with_capacity(query.len());
    let mut next_start = 0;
    for needle_char in query.chars() {
        let (offset, hay_char) = candidate[next_start..]
            .char_indices()
            .find(|(_, c)| *c == needle_char)?;
        positions.push(next_start + offset);
        next_start += offset + hay_char.len_utf8();
    }
    let gap_penalty: i64 = positions
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0] + 1) as i64)
        .sum();
    let length_penalty = (candidate.len() as i64 - query.len() as i64).max(0);
    Some(5_000 + (query.len() as i64) * 30 - gap_penalty * 6 - positions[0] as i64 - length_penalty)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/suggestions.rs"]
mod tests;
