//! Pure decision for the outbound media publish path.
//!
//! Swapping a track on an existing sender needs no signaling; only a kind
//! the link has never carried costs an offer cycle. The platform side reads
//! the sender table and applies whatever this verdict says.

/// What publishing a local track means for one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    /// A sender of this kind exists: swap the track in place, no signaling
    /// round trip.
    ReplaceSender,
    /// No sender yet: attach the track and run one offer cycle for this
    /// link alone.
    AddAndOffer,
    /// No sender and nothing should be added, for example muting a kind
    /// that was never published. The link is left untouched.
    Skip,
}

impl PublishAction {
    pub fn decide(has_sender: bool, add_missing: bool) -> Self {
        match (has_sender, add_missing) {
            (true, _) => PublishAction::ReplaceSender,
            (false, true) => PublishAction::AddAndOffer,
            (false, false) => PublishAction::Skip,
        }
    }
}
