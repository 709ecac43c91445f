//! Aggregate identity and the pending-event buffer.

use uuid::Uuid;

use crate::events::{DomainEvent, UserEvent};
use crate::ports::Clock;

/// Identity plus the events raised since the aggregate was loaded or created.
#[derive(Debug, Clone)]
pub struct AggregateIdentity {
    id: Uuid,
    pending: Vec<DomainEvent>,
}

impl AggregateIdentity {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            pending: Vec::new(),
        }
    }
}

/// Behaviour shared by every aggregate that owns an [`AggregateIdentity`].
pub trait AggregateRoot {
    fn identity(&self) -> &AggregateIdentity;
    fn identity_mut(&mut self) -> &mut AggregateIdentity;

    fn id(&self) -> Uuid {
        self.identity().id
    }

    /// Buffer an event stamped with the clock's current time.
    fn raise_event(&mut self, event: UserEvent, clock: &dyn Clock) {
        let id = self.id();
        self.identity_mut()
            .pending
            .push(DomainEvent::new(id, event, clock.now()));
    }

    /// Take all buffered events, leaving the buffer empty.
    fn drain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.identity_mut().pending)
    }

    fn pending_events(&self) -> &[DomainEvent] {
        &self.identity().pending
    }
}
