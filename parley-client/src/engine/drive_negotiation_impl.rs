use crate::engine::Engine;
use crate::engine::negotiation::{Step, StepOutcome};
use crate::error::ClientError;
use crate::transport::NegotiationBackend;
use parley_core::ClientSignal;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

impl Engine {
    /// Starts the next negotiation step if the session is idle and has work.
    pub(super) fn pump(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.step.is_some() {
            return;
        }
        debug_assert!(!session.negotiation.is_in_flight());
        let Some(backend) = session.backend.clone() else {
            return;
        };
        let Some(step) = session.negotiation.next_step() else {
            return;
        };

        debug!("Starting negotiation step: {}", step_name(&step));
        session.step = Some(tokio::spawn(run_step(backend, step)));
    }

    pub(super) async fn handle_step_done(
        &mut self,
        result: Result<Result<StepOutcome, ClientError>, JoinError>,
    ) {
        let outcome = match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                self.fail(format!("negotiation step failed: {e}")).await;
                return;
            }
            Err(e) if e.is_cancelled() => return,
            Err(e) => {
                self.fail(format!("negotiation step panicked: {e}")).await;
                return;
            }
        };

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.negotiation.complete(&outcome);

        match outcome {
            StepOutcome::OfferCreated(description) => {
                info!("Sending offer");
                session.signal(ClientSignal::SessionOffer {
                    room_id: session.room_id.clone(),
                    target_peer_id: session.remote_peer.clone(),
                    description,
                });
            }
            StepOutcome::AnswerCreated(description) => {
                info!("Sending answer");
                session.signal(ClientSignal::SessionAnswer {
                    room_id: session.room_id.clone(),
                    target_peer_id: session.remote_peer.clone(),
                    description,
                });
            }
            StepOutcome::AnswerAccepted => debug!("Remote answer applied"),
            StepOutcome::CandidatesApplied(n) => debug!("Applied {} remote candidate(s)", n),
        }

        self.pump();
    }
}

async fn run_step(
    backend: Arc<dyn NegotiationBackend>,
    step: Step,
) -> Result<StepOutcome, ClientError> {
    match step {
        Step::Initiate => backend.create_offer().await.map(StepOutcome::OfferCreated),

        Step::AcceptOffer(offer) => backend
            .accept_offer(offer)
            .await
            .map(StepOutcome::AnswerCreated),

        Step::AcceptAnswer(answer) => {
            backend.accept_answer(answer).await?;
            Ok(StepOutcome::AnswerAccepted)
        }

        // A bad candidate only loses one path; it does not end the session.
        Step::ApplyCandidates(candidates) => {
            let mut applied = 0;
            for candidate in candidates {
                match backend.add_candidate(candidate).await {
                    Ok(()) => applied += 1,
                    Err(e) => warn!("Failed to apply remote candidate: {}", e),
                }
            }
            Ok(StepOutcome::CandidatesApplied(applied))
        }
    }
}

fn step_name(step: &Step) -> &'static str {
    match step {
        Step::Initiate => "initiate",
        Step::AcceptOffer(_) => "accept-offer",
        Step::AcceptAnswer(_) => "accept-answer",
        Step::ApplyCandidates(_) => "apply-candidates",
    }
}
