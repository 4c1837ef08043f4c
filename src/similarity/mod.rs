//! Duplicate-detection heuristic.
//!
//! Given a draft title and description, pick out existing issues that share
//! meaningful words with it. The check is advisory: it never blocks creation
//! and a failed fetch simply yields no matches.

use crate::model::Issue;
use crate::storage::{IssueStore, ListFilters};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Most matches reported for one draft.
pub const MAX_MATCHES: usize = 5;

/// Minimum title length (chars) that triggers a check.
pub const MIN_TITLE_CHARS: usize = 3;

/// Minimum description length (chars) that triggers a check.
pub const MIN_DESCRIPTION_CHARS: usize = 5;

const STOP_WORDS_LIST: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "her", "was", "one", "our",
    "out", "day", "get", "has", "him", "his", "how", "its", "may", "new", "now", "old", "see",
    "two", "who", "way", "use", "she", "had", "did", "say", "man", "boy", "let", "put", "too",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS_LIST.iter().copied().collect());

/// Whether a draft is long enough to be worth checking.
#[must_use]
pub fn should_check(title: &str, description: &str) -> bool {
    title.chars().count() >= MIN_TITLE_CHARS
        || description.chars().count() >= MIN_DESCRIPTION_CHARS
}

/// Lower-cased tokens of title and description longer than two chars,
/// minus stop words.
#[must_use]
pub fn search_terms(title: &str, description: &str) -> Vec<String> {
    tokens(title)
        .chain(tokens(description))
        .filter(|word| word.chars().count() > 2 && !STOP_WORDS.contains(word.as_str()))
        .collect()
}

/// Issues that look like duplicates of the draft, in input order, at most
/// [`MAX_MATCHES`].
#[must_use]
pub fn find_similar(title: &str, description: &str, issues: &[Issue]) -> Vec<Issue> {
    if !should_check(title, description) {
        return Vec::new();
    }

    let terms = search_terms(title, description);
    if terms.is_empty() {
        return Vec::new();
    }

    let title_words: Vec<String> = tokens(title)
        .filter(|word| word.chars().count() > 3)
        .collect();

    issues
        .iter()
        .filter(|issue| {
            let issue_title = issue.title.to_lowercase();
            let issue_description = issue.description.to_lowercase();
            let contains =
                |needle: &str| issue_title.contains(needle) || issue_description.contains(needle);

            let match_count = terms.iter().filter(|term| contains(term.as_str())).count();
            let title_similar = title_words.iter().any(|word| contains(word.as_str()));

            match_count > 0 || title_similar
        })
        .take(MAX_MATCHES)
        .cloned()
        .collect()
}

/// Fetch every issue from `store` and run [`find_similar`].
///
/// Store failures are logged and reported as "no similar issues".
pub fn check_store<S: IssueStore + ?Sized>(
    store: &S,
    title: &str,
    description: &str,
) -> Vec<Issue> {
    if !should_check(title, description) {
        return Vec::new();
    }

    match store.list(&ListFilters::default()) {
        Ok(issues) => {
            let matches = find_similar(title, description, &issues);
            debug!(
                candidates = issues.len(),
                matches = matches.len(),
                "similarity check"
            );
            matches
        }
        Err(e) => {
            debug!(error = %e, "similarity check skipped: could not load issues");
            Vec::new()
        }
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IssueBoardError, Result};
    use crate::model::{NewIssue, Priority, Status};
    use chrono::Utc;

    fn issue(id: &str, title: &str, description: &str) -> Issue {
        Issue {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            priority: Priority::Medium,
            status: Status::Open,
            assigned_to: String::new(),
            created_by: "alice@example.com".to_string(),
            created_time: Utc::now(),
        }
    }

    #[test]
    fn short_draft_is_not_checked() {
        let existing = vec![issue("ib-1", "ab", "ab")];
        assert!(!should_check("ab", "abcd"));
        assert!(find_similar("ab", "abcd", &existing).is_empty());
    }

    #[test]
    fn either_field_triggers_check() {
        assert!(should_check("abc", ""));
        assert!(should_check("", "abcde"));
        // Chars, not bytes.
        assert!(!should_check("éé", "éééé"));
    }

    #[test]
    fn search_terms_drop_short_and_stop_words() {
        let terms = search_terms("The Login page", "is not working for me");
        assert_eq!(terms, vec!["login", "page", "working"]);
    }

    #[test]
    fn stop_words_are_deduplicated() {
        assert_eq!(STOP_WORDS.len(), STOP_WORDS_LIST.len());
    }

    #[test]
    fn only_stop_words_yield_nothing() {
        let existing = vec![issue("ib-1", "the and for", "you all can")];
        assert!(find_similar("the and for", "you all can", &existing).is_empty());
    }

    #[test]
    fn matches_on_shared_term() {
        let existing = vec![
            issue("ib-1", "Login page broken", "Users cannot sign in"),
            issue("ib-2", "Dark mode", "Add a theme toggle"),
        ];
        let found = find_similar("Login fails", "", &existing);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "ib-1");
    }

    #[test]
    fn matching_is_substring_based() {
        let existing = vec![issue("ib-1", "Pagination", "Lists are long")];
        assert!(find_similar("page", "", &existing).is_empty());
        assert_eq!(find_similar("pagina", "", &existing).len(), 1);
    }

    #[test]
    fn matches_description_text() {
        let existing = vec![issue("ib-1", "Crash", "Happens on checkout submit")];
        let found = find_similar("Error", "checkout blows up", &existing);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn no_shared_terms_yield_nothing() {
        let existing = vec![
            issue("ib-1", "Dark mode", "Add a theme toggle"),
            issue("ib-2", "Export CSV", "Download reports"),
        ];
        assert!(find_similar("Login broken", "Cannot sign in", &existing).is_empty());
    }

    #[test]
    fn results_capped_in_input_order() {
        let existing: Vec<Issue> = (0..8)
            .map(|n| issue(&format!("ib-{n}"), &format!("Login bug {n}"), "details"))
            .collect();
        let found = find_similar("Login", "", &existing);
        let ids: Vec<&str> = found.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["ib-0", "ib-1", "ib-2", "ib-3", "ib-4"]);
    }

    struct FailingStore;

    impl IssueStore for FailingStore {
        fn create(&mut self, _: &NewIssue, _: &str) -> Result<String> {
            Err(IssueBoardError::Config("offline".into()))
        }
        fn list(&self, _: &ListFilters) -> Result<Vec<Issue>> {
            Err(IssueBoardError::Config("offline".into()))
        }
        fn set_status(&mut self, _: &str, _: Status) -> Result<()> {
            Err(IssueBoardError::Config("offline".into()))
        }
        fn get(&self, _: &str) -> Result<Option<Issue>> {
            Err(IssueBoardError::Config("offline".into()))
        }
    }

    #[test]
    fn store_failure_fails_open() {
        assert!(check_store(&FailingStore, "Login broken", "Cannot sign in").is_empty());
    }
}
