//! Narrow fallbacks for vendor names that miss every curated entry.
//!
//! Each predicate is a single named rule; none of them is a general fuzzy
//! match. They only run after the exact and readable tiers fail.

use super::CompiledList;
use crate::naming::{to_canonical, to_readable};

/// Substrings that disqualify a tool from the list-events rule.
pub const LIST_EVENTS_BLOCKLIST: &[&str] = &[
    "event_type",
    "event_invitee",
    "cancel",
    "create",
    "delete",
    "update",
    "current_user",
    "group",
    "organization",
    "invitee_no_show",
    "webhook",
    "share",
    "scheduling_link",
];

const LISTING_VERBS: &[&str] = &["list", "get", "fetch"];
const EVENT_NOUNS: &[&str] = &["event", "events", "scheduled"];

/// A vendor name prepared once for all predicates.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Canonical form of the readable name.
    pub readable: String,
    pub tokens: Vec<String>,
    /// Snake-case forms of the raw and readable names, for substring rules.
    snake: [String; 2],
}

impl Candidate {
    pub fn new(raw_name: &str) -> Self {
        let raw = to_canonical(raw_name);
        let readable = to_canonical(&to_readable(raw_name));
        let tokens = readable.split(' ').map(str::to_string).collect();
        let snake = [raw.replace(' ', "_"), readable.replace(' ', "_")];
        Self {
            readable,
            tokens,
            snake,
        }
    }

    fn has_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    fn mentions(&self, fragment: &str) -> bool {
        self.snake.iter().any(|s| s.contains(fragment))
    }
}

/// "Get current user" style tools map onto a curated "get user" entry.
pub fn current_user(candidate: &Candidate, list: &CompiledList) -> bool {
    candidate.has_token("get")
        && candidate.readable.contains("current user")
        && list.any_entry(|e| e.contains("get user"))
}

/// A single-invitee getter is admitted when listing invitees is.
pub fn event_invitee(candidate: &Candidate, list: &CompiledList) -> bool {
    candidate.has_token("get")
        && candidate.readable.contains("event")
        && candidate.readable.contains("invitee")
        && list.any_entry(|e| e.contains("list event invitees"))
}

/// Read-only event listings, when "list events" is curated.
pub fn list_events(candidate: &Candidate, list: &CompiledList) -> bool {
    if !list.any_entry(|e| e == "list events") {
        return false;
    }

    let has_verb = LISTING_VERBS.iter().any(|v| candidate.has_token(v));
    let has_noun = EVENT_NOUNS.iter().any(|n| candidate.has_token(n));
    let blocked = LIST_EVENTS_BLOCKLIST.iter().any(|b| candidate.mentions(b));

    has_verb && has_noun && !blocked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[&str]) -> CompiledList {
        CompiledList::compile("calendly", entries.iter().copied())
    }

    #[test]
    fn current_user_requires_get_user_entry() {
        let c = Candidate::new("CALENDLY_GET_CURRENT_USER");
        assert!(current_user(&c, &list(&["Get user"])));
        assert!(!current_user(&c, &list(&["List events"])));
        assert!(!current_user(&Candidate::new("CALENDLY_GET_USER"), &list(&["Get user"])));
    }

    #[test]
    fn event_invitee_requires_listing_entry() {
        let c = Candidate::new("CALENDLY_GET_EVENT_INVITEE");
        assert!(event_invitee(&c, &list(&["List event invitees"])));
        assert!(!event_invitee(&c, &list(&["Get event"])));
        assert!(!event_invitee(
            &Candidate::new("CALENDLY_LIST_EVENT_INVITEES"),
            &list(&["List event invitees"])
        ));
    }

    #[test]
    fn list_events_only_triggers_with_entry() {
        let c = Candidate::new("CALENDLY_LIST_SCHEDULED_EVENTS");
        assert!(list_events(&c, &list(&["List events"])));
        assert!(!list_events(&c, &list(&["Get event"])));
    }

    #[test]
    fn list_events_needs_verb_and_noun() {
        let l = list(&["List events"]);
        assert!(list_events(&Candidate::new("GOOGLECALENDAR_EVENTS_LIST"), &l));
        assert!(list_events(&Candidate::new("CALENDLY_FETCH_EVENT"), &l));
        assert!(!list_events(&Candidate::new("CALENDLY_LIST_WEBHOOK_SUBSCRIPTIONS"), &l));
        assert!(!list_events(&Candidate::new("CALENDLY_REMOVE_EVENT"), &l));
    }

    #[test]
    fn list_events_blocklist() {
        let l = list(&["List events"]);
        for name in [
            "CALENDLY_LIST_EVENT_TYPES",
            "CALENDLY_LIST_EVENT_INVITEES_FOR_EVENT",
            "CALENDLY_GET_CANCELLED_EVENTS",
            "CALENDLY_LIST_GROUP_EVENTS",
            "CALENDLY_LIST_ORGANIZATION_EVENTS",
            "CALENDLY_GET_INVITEE_NO_SHOW_EVENT",
            "CALENDLY_GET_EVENT_SHARE",
            "CALENDLY_GET_CURRENT_USER_EVENTS",
        ] {
            assert!(!list_events(&Candidate::new(name), &l), "{name}");
        }
    }
}
