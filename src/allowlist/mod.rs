pub mod heuristics;
pub mod table;

use std::collections::{HashMap, HashSet};

use crate::connector::toolkit_for;
use crate::naming::{to_canonical, to_readable};
use heuristics::Candidate;

/// Which rule admitted a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Canonical vendor name equals a curated entry (with or without the
    /// toolkit prefix).
    Exact,
    /// Canonical readable name equals a curated entry.
    Readable,
    CurrentUser,
    EventInvitee,
    ListEvents,
    /// The integration has no curated list, so everything is exposed.
    Uncurated,
}

/// One integration's curated entries, pre-folded into every form the
/// matcher compares against.
#[derive(Debug, Clone, Default)]
pub struct CompiledList {
    /// Entries as written.
    written: HashSet<String>,
    /// Entries with their own prefix token removed.
    stripped: HashSet<String>,
    /// Stripped entries re-prefixed with the toolkit and type names, so a
    /// raw vendor name can match without being made readable first.
    prefixed: HashSet<String>,
}

impl CompiledList {
    pub fn compile<'a>(integration_type: &str, entries: impl IntoIterator<Item = &'a str>) -> Self {
        let prefixes = [
            to_canonical(&toolkit_for(integration_type)),
            to_canonical(integration_type),
        ];

        let mut list = Self::default();
        for entry in entries {
            let written = to_canonical(entry);
            if written.is_empty() {
                continue;
            }

            let mut stripped = to_canonical(&to_readable(entry));
            for prefix in &prefixes {
                if let Some(rest) = stripped.strip_prefix(&format!("{prefix} ")) {
                    stripped = rest.to_string();
                    break;
                }
            }

            for prefix in &prefixes {
                list.prefixed.insert(format!("{prefix} {stripped}"));
            }
            list.written.insert(written);
            list.stripped.insert(stripped);
        }
        list
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    /// True if any written or stripped entry satisfies `pred`.
    pub fn any_entry(&self, pred: impl Fn(&str) -> bool) -> bool {
        self.written
            .iter()
            .chain(self.stripped.iter())
            .any(|e| pred(e))
    }

    fn matches_exact(&self, raw_canonical: &str) -> bool {
        self.written.contains(raw_canonical) || self.prefixed.contains(raw_canonical)
    }

    fn matches_readable(&self, readable_canonical: &str) -> bool {
        self.written.contains(readable_canonical) || self.stripped.contains(readable_canonical)
    }
}

/// Per-integration policy deciding which vendor tools reach the agent.
///
/// Integrations without a curated list are fail-open: every tool is
/// allowed. A curated but empty list allows nothing.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    lists: HashMap<String, CompiledList>,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The curated table shipped with the crate.
    pub fn builtin() -> Self {
        table::CURATED
            .iter()
            .fold(Self::new(), |acc, (integration_type, entries)| {
                acc.with_list(integration_type, entries.iter().copied())
            })
    }

    /// Add or replace the list for one integration type.
    pub fn with_list<'a>(
        mut self,
        integration_type: &str,
        entries: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.lists.insert(
            type_key(integration_type),
            CompiledList::compile(integration_type, entries),
        );
        self
    }

    pub fn is_curated(&self, integration_type: &str) -> bool {
        self.lists.contains_key(&type_key(integration_type))
    }

    pub fn is_allowed(&self, raw_name: &str, integration_type: &str) -> bool {
        self.match_tier(raw_name, integration_type).is_some()
    }

    /// The first tier that admits `raw_name`, or `None` if it's rejected.
    pub fn match_tier(&self, raw_name: &str, integration_type: &str) -> Option<MatchTier> {
        let Some(list) = self.lists.get(&type_key(integration_type)) else {
            return Some(MatchTier::Uncurated);
        };
        if list.is_empty() {
            return None;
        }

        if list.matches_exact(&to_canonical(raw_name)) {
            return Some(MatchTier::Exact);
        }

        let candidate = Candidate::new(raw_name);
        if list.matches_readable(&candidate.readable) {
            return Some(MatchTier::Readable);
        }

        if heuristics::current_user(&candidate, list) {
            Some(MatchTier::CurrentUser)
        } else if heuristics::event_invitee(&candidate, list) {
            Some(MatchTier::EventInvitee)
        } else if heuristics::list_events(&candidate, list) {
            Some(MatchTier::ListEvents)
        } else {
            None
        }
    }
}

fn type_key(integration_type: &str) -> String {
    to_canonical(integration_type).replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_event_matches_exactly() {
        let allow = AllowList::builtin();
        assert_eq!(
            allow.match_tier("CALENDLY_CANCEL_EVENT", "calendly"),
            Some(MatchTier::Exact)
        );
    }

    #[test]
    fn invitee_tools() {
        let allow = AllowList::builtin();
        assert_eq!(
            allow.match_tier("CALENDLY_LIST_EVENT_INVITEES", "calendly"),
            Some(MatchTier::Exact)
        );
        assert_eq!(
            allow.match_tier("CALENDLY_GET_EVENT_INVITEE", "calendly"),
            Some(MatchTier::EventInvitee)
        );
    }

    #[test]
    fn current_user_maps_to_get_user() {
        let allow = AllowList::builtin();
        assert_eq!(
            allow.match_tier("CALENDLY_GET_CURRENT_USER", "calendly"),
            Some(MatchTier::CurrentUser)
        );
    }

    #[test]
    fn one_off_entry_matches() {
        let allow = AllowList::builtin();
        assert!(allow.is_allowed("CALENDLY_CREATE_ONE_OFF_EVENT_TYPE", "calendly"));
    }

    #[test]
    fn readable_tier_catches_foreign_prefix() {
        let allow = AllowList::builtin();
        assert_eq!(
            allow.match_tier("GCAL_LIST_CALENDARS", "google_calendar"),
            Some(MatchTier::Readable)
        );
    }

    #[test]
    fn prefixed_entries_match_both_ways() {
        let allow = AllowList::builtin();
        // Authored as GOOGLECALENDAR_FIND_FREE_SLOTS
        assert_eq!(
            allow.match_tier("GOOGLECALENDAR_FIND_FREE_SLOTS", "google_calendar"),
            Some(MatchTier::Exact)
        );
        assert_eq!(
            allow.match_tier("Find free slots", "google_calendar"),
            Some(MatchTier::Readable)
        );
        // Authored as "Salesforce Create note"
        assert_eq!(
            allow.match_tier("SALESFORCE_CREATE_NOTE", "salesforce"),
            Some(MatchTier::Exact)
        );
    }

    #[test]
    fn list_events_heuristic() {
        let allow = AllowList::builtin();
        assert_eq!(
            allow.match_tier("CALENDLY_LIST_SCHEDULED_EVENTS", "calendly"),
            Some(MatchTier::ListEvents)
        );
        assert!(!allow.is_allowed("CALENDLY_LIST_WEBHOOK_SUBSCRIPTIONS", "calendly"));
        assert!(!allow.is_allowed("CALENDLY_DELETE_EVENT", "calendly"));
    }

    #[test]
    fn rejects_uncurated_actions_of_curated_integration() {
        let allow = AllowList::builtin();
        assert!(!allow.is_allowed("HUBSPOT_DELETE_CONTACT", "hubspot"));
        assert!(!allow.is_allowed("CALENDLY_CREATE_WEBHOOK_SUBSCRIPTION", "calendly"));
    }

    #[test]
    fn uncurated_integration_is_fail_open() {
        let allow = AllowList::builtin();
        assert!(!allow.is_curated("zoom"));
        assert_eq!(
            allow.match_tier("ZOOM_DELETE_MEETING", "zoom"),
            Some(MatchTier::Uncurated)
        );
    }

    #[test]
    fn empty_curated_list_denies() {
        let allow = AllowList::new().with_list("calendly", Vec::<&str>::new());
        assert!(allow.is_curated("calendly"));
        assert!(!allow.is_allowed("CALENDLY_CANCEL_EVENT", "calendly"));
    }

    #[test]
    fn integration_type_lookup_is_normalized() {
        let allow = AllowList::builtin();
        assert!(allow.is_curated("Google Calendar"));
        assert!(allow.is_curated("google-calendar"));
        assert!(!allow.is_allowed("GOOGLECALENDAR_DELETE_CALENDAR", "Google Calendar"));
    }

    #[test]
    fn matching_is_deterministic() {
        let allow = AllowList::builtin();
        let names = [
            "CALENDLY_CANCEL_EVENT",
            "CALENDLY_GET_EVENT_INVITEE",
            "CALENDLY_LIST_EVENT_TYPES",
            "CALENDLY_CREATE_WEBHOOK_SUBSCRIPTION",
        ];
        let first: Vec<_> = names.iter().map(|n| allow.match_tier(n, "calendly")).collect();
        let again: Vec<_> = names.iter().rev().map(|n| allow.match_tier(n, "calendly")).collect();
        assert_eq!(first, again.into_iter().rev().collect::<Vec<_>>());
    }
}
