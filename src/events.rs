use crate::allowlist::MatchTier;
use crate::connector::Strategy;

/// Progress events emitted during a sync run, for streaming to a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    IntegrationStarted { integration_type: String, toolkit: String },
    ToolsFetched { integration_type: String, count: usize, strategy: Strategy },
    ToolAllowed { name: String, tier: MatchTier },
    ToolRejected { name: String },
    ToolCreated { name: String, id: String },
    ToolReused { name: String, id: String },
    ToolDuplicate { name: String },
    IntegrationFailed { integration_type: String, message: String },
    Finished { tool_ids: usize, errors: usize },
}
