// Moderation core: language routing, thresholds, and the fail-open policy.
//
// Flow: Moderator::evaluate identifies the language (failures become
// Undetected), then policy::decide picks at most one oracle by language code
// and shapes the verdict into a ModerationResult.

pub mod dispatcher;
pub mod policy;
pub mod result;

pub use dispatcher::Moderator;
pub use policy::{decide, OracleSet, Route};
pub use result::{ModerationResult, SkipReason};
