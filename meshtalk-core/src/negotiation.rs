//! Per-link negotiation state machine.
//!
//! One `Negotiation` lives inside every PeerLink and decides, without
//! touching any platform API, whether an offer may start now, must wait, or
//! how an incoming description should be treated. The offerer role assigned
//! by the relay is the single tie-break for glare; arrival order never is.

use crate::model::SdpKind;

/// Which side of the pair initiates the description exchange. Fixed for the
/// lifetime of the link, derived from the relay's `should_create_offer` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    Offerer,
    Answerer,
}

impl LinkRole {
    pub fn from_should_create_offer(flag: bool) -> Self {
        if flag { LinkRole::Offerer } else { LinkRole::Answerer }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Connecting,
    Stable,
    Renegotiating,
    Closed,
}

/// Verdict for a locally requested offer cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// Create and send the offer now.
    Start,
    /// A step is already in flight for this link; the request is coalesced
    /// and replayed once the pending answer lands.
    Deferred,
    /// The link is closed, nothing to do.
    Rejected,
}

/// Verdict for an incoming remote description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteSdpOutcome {
    /// Apply the offer and synthesize an answer. `discard_local` is set when
    /// our own pending offer lost the glare tie-break and must be rolled
    /// back first.
    AcceptOffer { discard_local: bool },
    /// The answer to our outstanding offer; apply it.
    AcceptAnswer,
    /// Concurrent offer received while we hold the offerer role; the remote
    /// side discards its own, so this one is dropped.
    IgnoreOffer,
    /// Answer with no outstanding offer, or traffic on a closed link.
    UnexpectedSdp,
}

#[derive(Debug)]
pub struct Negotiation {
    role: LinkRole,
    state: LinkState,
    offer_outstanding: bool,
    offer_deferred: bool,
}

impl Negotiation {
    pub fn new(role: LinkRole) -> Self {
        Self {
            role,
            state: LinkState::Idle,
            offer_outstanding: false,
            offer_deferred: false,
        }
    }

    pub fn role(&self) -> LinkRole {
        self.role
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == LinkState::Closed
    }

    /// Request a local offer cycle, either the initial one or a
    /// renegotiation after a track change.
    pub fn begin_offer(&mut self) -> OfferOutcome {
        match self.state {
            LinkState::Closed => OfferOutcome::Rejected,
            _ if self.offer_outstanding => {
                self.offer_deferred = true;
                OfferOutcome::Deferred
            }
            LinkState::Idle | LinkState::Connecting => {
                self.state = LinkState::Connecting;
                self.offer_outstanding = true;
                OfferOutcome::Start
            }
            LinkState::Stable | LinkState::Renegotiating => {
                self.state = LinkState::Renegotiating;
                self.offer_outstanding = true;
                OfferOutcome::Start
            }
        }
    }

    /// Classify a remote description that just arrived.
    pub fn remote_description(&mut self, kind: SdpKind) -> RemoteSdpOutcome {
        if self.state == LinkState::Closed {
            return RemoteSdpOutcome::UnexpectedSdp;
        }

        match kind {
            SdpKind::Offer if self.offer_outstanding => match self.role {
                LinkRole::Offerer => RemoteSdpOutcome::IgnoreOffer,
                LinkRole::Answerer => {
                    self.offer_outstanding = false;
                    RemoteSdpOutcome::AcceptOffer { discard_local: true }
                }
            },
            SdpKind::Offer => {
                if self.state == LinkState::Idle {
                    self.state = LinkState::Connecting;
                }
                RemoteSdpOutcome::AcceptOffer {
                    discard_local: false,
                }
            }
            SdpKind::Answer if self.offer_outstanding => RemoteSdpOutcome::AcceptAnswer,
            SdpKind::Answer => RemoteSdpOutcome::UnexpectedSdp,
        }
    }

    /// Our answer to a remote offer was set locally and relayed. Returns
    /// true when a coalesced offer request (possibly one discarded by the
    /// glare tie-break) should start now.
    pub fn answer_sent(&mut self) -> bool {
        if self.state == LinkState::Closed {
            return false;
        }
        self.state = LinkState::Stable;
        std::mem::take(&mut self.offer_deferred)
    }

    /// The remote answer to our offer was applied. Returns true when a
    /// coalesced renegotiation request should start now.
    pub fn answer_applied(&mut self) -> bool {
        if self.state == LinkState::Closed {
            return false;
        }
        self.offer_outstanding = false;
        self.state = LinkState::Stable;
        std::mem::take(&mut self.offer_deferred)
    }

    pub fn close(&mut self) {
        self.state = LinkState::Closed;
        self.offer_outstanding = false;
        self.offer_deferred = false;
    }
}
