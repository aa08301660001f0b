//! Dispatch of verified events by type tag.

use super::stripe_event::StripeEventType;
use super::webhook_verifier::VerifiedEvent;

/// Where a verified event goes next.
#[derive(Debug, Clone)]
pub enum EventRoute {
    /// Record the payment for this completed session.
    CheckoutSessionCompleted(VerifiedEvent),
    /// Acknowledge without action.
    Ignored { event_type: String },
}

/// Pure lookup from event type tag to route.
pub struct EventRouter;

impl EventRouter {
    pub fn route(event: VerifiedEvent) -> EventRoute {
        match event.event().parsed_type() {
            StripeEventType::CheckoutSessionCompleted => {
                EventRoute::CheckoutSessionCompleted(event)
            }
            StripeEventType::Unknown => EventRoute::Ignored {
                event_type: event.into_inner().event_type,
            },
        }
    }
}
