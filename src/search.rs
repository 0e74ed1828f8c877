//! The search input and the two things it can do.
//!
//! In [`SearchMode::ResourceSearch`] a submission names a resource (by alias)
//! to switch the main view to, or one of the exit keywords. In
//! [`SearchMode::TableSearch`] a submission becomes the filter for the rows
//! currently shown. Mode changes arrive as signals through the dispatcher;
//! everything here runs on the UI thread.

use tracing::{debug, info};

use crate::resource::{Resource, ResourceHooks, ResourceKind};

/// Submissions that quit instead of searching.
pub const EXIT_KEYWORDS: [&str; 2] = ["q", "exit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    ResourceSearch,
    TableSearch,
}

/// Callbacks the coordinator drives on submission.
pub trait SearchHost {
    /// Repaint the main view from `resource` with `filter`.
    fn update_view(&mut self, resource: &Resource, filter: &str);
    /// No resource answers to `text`.
    fn resource_not_found(&mut self, text: &str);
    /// Shut the application down.
    fn exit(&mut self);
}

/// What a submission did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Switched(ResourceKind),
    NotFound,
    Filtered,
    Exit,
}

#[derive(Debug)]
pub struct SearchCoordinator {
    mode: SearchMode,
    input: String,
    focused: bool,
    hooks: ResourceHooks,
}

impl SearchCoordinator {
    pub fn new(hooks: ResourceHooks) -> Self {
        Self {
            mode: SearchMode::default(),
            input: String::new(),
            focused: false,
            hooks,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Prompt shown in front of the input.
    pub fn label(&self) -> &'static str {
        match self.mode {
            SearchMode::ResourceSearch => ":",
            SearchMode::TableSearch => "/",
        }
    }

    pub fn hooks(&self) -> &ResourceHooks {
        &self.hooks
    }

    /// Handler for the focus-search signal.
    pub fn focus_resource_search(&mut self) {
        self.mode = SearchMode::ResourceSearch;
        self.input.clear();
        self.focused = true;
    }

    /// Handler for the start-table-search signal.
    pub fn start_table_search(&mut self) {
        self.mode = SearchMode::TableSearch;
        self.input.clear();
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.input.clear();
        self.focused = false;
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Completions for the current input, in resource-search mode only.
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self.mode {
            SearchMode::ResourceSearch => autocomplete(&self.input),
            SearchMode::TableSearch => Vec::new(),
        }
    }

    /// Replace the input with the first suggestion, if any.
    pub fn accept_suggestion(&mut self) -> bool {
        match self.suggestions().first() {
            Some(first) => {
                self.input = first.to_string();
                true
            }
            None => false,
        }
    }

    /// Act on the current input.
    pub fn submit(&mut self, active: &mut Resource, host: &mut dyn SearchHost) -> SubmitOutcome {
        let text = self.input.trim().to_string();
        match self.mode {
            SearchMode::ResourceSearch => {
                if EXIT_KEYWORDS.contains(&text.as_str()) {
                    info!("exit requested from search");
                    host.exit();
                    return SubmitOutcome::Exit;
                }
                match ResourceKind::from_alias(&text) {
                    Some(kind) => {
                        info!(resource = kind.name(), "switching resource");
                        active.switch_to(kind, self.hooks.clone());
                        host.update_view(active, "");
                        self.blur();
                        SubmitOutcome::Switched(kind)
                    }
                    None => {
                        debug!(%text, "no resource matches");
                        host.resource_not_found(&text);
                        SubmitOutcome::NotFound
                    }
                }
            }
            SearchMode::TableSearch => {
                host.update_view(active, &text);
                self.focused = false;
                SubmitOutcome::Filtered
            }
        }
    }
}

/// Aliases starting with `text`, ignoring case.
///
/// Empty input and a single candidate both yield no suggestions.
pub fn autocomplete(text: &str) -> Vec<&'static str> {
    if text.is_empty() {
        return Vec::new();
    }
    let prefix = text.to_lowercase();
    let candidates: Vec<&'static str> = ResourceKind::ALL
        .iter()
        .flat_map(|kind| kind.aliases().iter().copied())
        .filter(|alias| alias.to_lowercase().starts_with(&prefix))
        .collect();
    if candidates.len() <= 1 {
        return Vec::new();
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autocomplete_empty_input() {
        assert!(autocomplete("").is_empty());
    }

    #[test]
    fn test_autocomplete_single_candidate_suppressed() {
        // only "kafka" starts with "k"
        assert!(autocomplete("k").is_empty());
        assert!(autocomplete("topics").is_empty());
    }

    #[test]
    fn test_autocomplete_multiple_candidates() {
        assert_eq!(autocomplete("c"), vec!["context", "ctx", "consumergroups", "consumers", "cgs"]);
        assert_eq!(autocomplete("CON"), vec!["context", "consumergroups", "consumers"]);
        assert_eq!(autocomplete("t"), vec!["topics", "ts"]);
    }

    #[test]
    fn test_autocomplete_no_match() {
        assert!(autocomplete("zzz").is_empty());
    }
}
