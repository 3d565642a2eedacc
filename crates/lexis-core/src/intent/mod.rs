//! Intent recognition: what a learner wants to know, and about which term.

mod classifier;
mod extraction;
mod rules;
mod taxonomy;

pub use classifier::{IntentClassifier, IntentConfig, SignalVote};
pub use extraction::{clean_cjk_candidate, extract_target_term, is_valid_target};
pub use rules::pattern_signal;
pub use taxonomy::{profile, IntentProfile, TAXONOMY};
