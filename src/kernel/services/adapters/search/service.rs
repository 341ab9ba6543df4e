//! Default text match service
//!
//! Filters are evaluated first (AND), then free-text terms (OR) over the
//! entity fields selected by the scope set.

use super::matcher::{occurrences_in, TermPattern};
use crate::kernel::services::ports::{
    Entity, LogMessage, MatchOptions, MatchResult, MatchService, NetworkTask,
    Occurrence, SearchFilter, SearchParameters, SearchScope,
};
use std::borrow::Cow;
use std::sync::{Arc, Mutex};

const MAX_OCCURRENCES_PER_SCOPE: usize = 8;
const BINARY_PROBE_LEN: usize = 8192;

type CompiledPatterns = Result<Arc<[TermPattern]>, regex::Error>;

struct PatternCache {
    terms: Vec<String>,
    options: MatchOptions,
    patterns: CompiledPatterns,
}

#[derive(Default)]
pub struct ConsoleSearchService {
    cache: Mutex<Option<PatternCache>>,
}

impl ConsoleSearchService {
    pub fn new() -> Self {
        Self::default()
    }

    fn patterns(&self, parameters: &SearchParameters) -> CompiledPatterns {
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(cached) = cache.as_ref() {
            if cached.terms == parameters.search_terms && cached.options == parameters.options {
                return cached.patterns.clone();
            }
        }

        let patterns = parameters
            .search_terms
            .iter()
            .map(|term| TermPattern::compile(term, &parameters.options))
            .collect::<Result<Vec<_>, _>>()
            .map(Arc::from);
        *cache = Some(PatternCache {
            terms: parameters.search_terms.clone(),
            options: parameters.options,
            patterns: patterns.clone(),
        });
        patterns
    }
}

impl MatchService for ConsoleSearchService {
    fn matches(
        &self,
        entity: &Entity,
        parameters: &SearchParameters,
    ) -> MatchResult<Option<Vec<Occurrence>>> {
        if !parameters
            .filters
            .iter()
            .all(|filter| filter_matches(filter, entity))
        {
            return Ok(None);
        }
        if parameters.search_terms.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let patterns = self.patterns(parameters)?;
        let mut occurrences = Vec::new();
        for &scope in &parameters.scopes {
            let Some(text) = scope_text(entity, scope) else {
                continue;
            };

            let mut ranges = Vec::new();
            for pattern in patterns.iter() {
                ranges.extend(pattern.find_all(&text, MAX_OCCURRENCES_PER_SCOPE));
            }
            if ranges.is_empty() {
                continue;
            }
            ranges.sort_unstable();
            ranges.dedup();
            ranges.truncate(MAX_OCCURRENCES_PER_SCOPE);
            occurrences.extend(occurrences_in(scope, &text, &ranges));
        }

        Ok((!occurrences.is_empty()).then_some(occurrences))
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// A filter that does not apply to the entity kind never matches, negated or not.
fn filter_matches(filter: &SearchFilter, entity: &Entity) -> bool {
    match (filter, entity) {
        (SearchFilter::StatusCode { ranges, negated }, Entity::Task(task)) => {
            let hit = task
                .status_code
                .is_some_and(|code| ranges.iter().any(|r| r.contains(code)));
            hit != *negated
        }
        (SearchFilter::Host { values, negated }, Entity::Task(task)) => {
            let hit = task
                .host()
                .is_some_and(|host| values.iter().any(|v| contains_ignore_case(host, v)));
            hit != *negated
        }
        (SearchFilter::Method { values, negated }, Entity::Task(task)) => {
            let hit = values.iter().any(|v| v.eq_ignore_ascii_case(&task.method));
            hit != *negated
        }
        (SearchFilter::Path { values, negated }, Entity::Task(task)) => {
            let path = task.path();
            let hit = values.iter().any(|v| contains_ignore_case(path, v));
            hit != *negated
        }
        (SearchFilter::Level { values, negated }, Entity::Message(message)) => {
            values.contains(&message.level) != *negated
        }
        (SearchFilter::Label { values, negated }, Entity::Message(message)) => {
            let hit = values.iter().any(|v| v.eq_ignore_ascii_case(&message.label));
            hit != *negated
        }
        _ => false,
    }
}

fn scope_text(entity: &Entity, scope: SearchScope) -> Option<Cow<'_, str>> {
    match entity {
        Entity::Message(message) => message_text(message, scope),
        Entity::Task(task) => task_text(task, scope),
    }
}

fn message_text(message: &LogMessage, scope: SearchScope) -> Option<Cow<'_, str>> {
    match scope {
        SearchScope::Message => Some(Cow::Borrowed(message.text.as_str())),
        SearchScope::Metadata if !message.metadata.is_empty() => {
            Some(Cow::Owned(join_pairs(&message.metadata)))
        }
        _ => None,
    }
}

fn task_text(task: &NetworkTask, scope: SearchScope) -> Option<Cow<'_, str>> {
    match scope {
        SearchScope::Url => Some(Cow::Borrowed(task.url.as_str())),
        SearchScope::QueryItems => {
            let query = task.query();
            (!query.is_empty()).then(|| Cow::Owned(query.replace('&', "\n")))
        }
        SearchScope::RequestHeaders if !task.request_headers.is_empty() => {
            Some(Cow::Owned(join_pairs(&task.request_headers)))
        }
        SearchScope::ResponseHeaders if !task.response_headers.is_empty() => {
            Some(Cow::Owned(join_pairs(&task.response_headers)))
        }
        SearchScope::RequestBody => body_text(task.request_body.as_deref(), "request"),
        SearchScope::ResponseBody => body_text(task.response_body.as_deref(), "response"),
        _ => None,
    }
}

fn is_likely_binary(content: &[u8]) -> bool {
    content.iter().take(BINARY_PROBE_LEN).any(|&b| b == 0)
}

/// Undecodable bodies are skipped for this scope only.
fn body_text<'a>(body: Option<&'a [u8]>, which: &str) -> Option<Cow<'a, str>> {
    let body = body.filter(|b| !b.is_empty())?;
    if is_likely_binary(body) {
        return None;
    }
    match std::str::from_utf8(body) {
        Ok(text) => Some(Cow::Borrowed(text)),
        Err(e) => {
            tracing::trace!(body = which, error = %e, "skipping non-UTF-8 body");
            None
        }
    }
}

fn join_pairs(pairs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
    }
    out
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/service.rs"]
mod tests;
