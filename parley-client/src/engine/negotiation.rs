use parley_core::{PathCandidate, SessionDescription};
use std::collections::VecDeque;

/// One unit of work against the negotiation backend.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    Initiate,
    AcceptOffer(SessionDescription),
    AcceptAnswer(SessionDescription),
    ApplyCandidates(Vec<PathCandidate>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StepOutcome {
    OfferCreated(SessionDescription),
    AnswerCreated(SessionDescription),
    AnswerAccepted,
    CandidatesApplied(usize),
}

/// Bookkeeping for one negotiation, free of any I/O.
///
/// Inputs may arrive in any order relative to backend readiness. Work is
/// handed out one [`Step`] at a time and nothing else is released until
/// [`NegotiationSession::complete`] reports the outcome. Candidates stay
/// queued until a remote description has been accepted.
#[derive(Debug, Default)]
pub(crate) struct NegotiationSession {
    backend_ready: bool,
    initiate_deferred: bool,
    pending_offer: Option<SessionDescription>,
    pending_answer: Option<SessionDescription>,
    pending_candidates: VecDeque<PathCandidate>,
    remote_accepted: bool,
    in_flight: bool,
}

impl NegotiationSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn backend_ready(&mut self) {
        self.backend_ready = true;
    }

    pub(crate) fn is_backend_ready(&self) -> bool {
        self.backend_ready
    }

    pub(crate) fn request_initiate(&mut self) {
        self.initiate_deferred = true;
    }

    /// Returns true when an earlier, still unapplied offer was replaced.
    pub(crate) fn offer_received(&mut self, offer: SessionDescription) -> bool {
        self.pending_offer.replace(offer).is_some()
    }

    pub(crate) fn answer_received(&mut self, answer: SessionDescription) {
        self.pending_answer = Some(answer);
    }

    /// Queues a remote candidate. End-of-candidates markers are ignored.
    pub(crate) fn candidate_received(&mut self, candidate: PathCandidate) -> bool {
        if candidate.is_end_of_candidates() {
            return false;
        }
        self.pending_candidates.push_back(candidate);
        true
    }

    /// Next step to run, if any. Marks the session in flight.
    pub(crate) fn next_step(&mut self) -> Option<Step> {
        if self.in_flight || !self.backend_ready {
            return None;
        }

        let step = if self.initiate_deferred {
            self.initiate_deferred = false;
            Step::Initiate
        } else if let Some(offer) = self.pending_offer.take() {
            Step::AcceptOffer(offer)
        } else if let Some(answer) = self.pending_answer.take() {
            Step::AcceptAnswer(answer)
        } else if self.remote_accepted && !self.pending_candidates.is_empty() {
            Step::ApplyCandidates(self.pending_candidates.drain(..).collect())
        } else {
            return None;
        };

        self.in_flight = true;
        Some(step)
    }

    pub(crate) fn complete(&mut self, outcome: &StepOutcome) {
        self.in_flight = false;
        if matches!(
            outcome,
            StepOutcome::AnswerCreated(_) | StepOutcome::AnswerAccepted
        ) {
            self.remote_accepted = true;
        }
    }

    pub(crate) fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    #[cfg(test)]
    pub(crate) fn remote_accepted(&self) -> bool {
        self.remote_accepted
    }

    pub(crate) fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    #[cfg(test)]
    pub(crate) fn has_pending_offer(&self) -> bool {
        self.pending_offer.is_some()
    }
}
