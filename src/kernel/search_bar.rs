use crate::kernel::services::ports::{MatchOptions, SearchParameters, SearchToken};

/// Search bar contents as typed: raw text plus applied token chips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchBarState {
    pub text: String,
    pub tokens: Vec<SearchToken>,
}

impl SearchBarState {
    pub fn parameters(&self, options: MatchOptions) -> SearchParameters {
        SearchParameters::new(&self.text, &self.tokens, options)
    }

    pub fn is_empty(&self, options: MatchOptions) -> bool {
        self.parameters(options).is_empty()
    }

    pub fn set_text(&mut self, text: String) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text;
        true
    }

    pub fn replace(&mut self, text: String, tokens: Vec<SearchToken>) -> bool {
        let changed = self.text != text || self.tokens != tokens;
        self.text = text;
        self.tokens = tokens;
        changed
    }

    /// Clears the text and appends `token` unless it is already applied.
    pub fn apply_token(&mut self, token: SearchToken) -> bool {
        let mut changed = !self.text.is_empty();
        self.text.clear();
        if !self.tokens.contains(&token) {
            self.tokens.push(token);
            changed = true;
        }
        changed
    }

    pub fn remove_token(&mut self, index: usize) -> bool {
        if index >= self.tokens.len() {
            return false;
        }
        self.tokens.remove(index);
        true
    }
}
