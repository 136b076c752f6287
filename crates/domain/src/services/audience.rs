//! Audience resolution for broadcast messages.
//!
//! Turns an event and an [`AudienceSelector`] into the concrete attendees
//! that receive a message now and the invites whose copy waits for acceptance.

use std::collections::HashSet;
use uuid::Uuid;

use super::store::{MessageStore, StoreError};
use crate::models::{Attendee, AudienceSelector, Invite};

/// Concrete recipients of a broadcast.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAudience {
    /// Delivery targets: messages are visible immediately.
    pub attendees: Vec<Attendee>,
    /// Queue targets: messages wait until the invite is accepted.
    pub invites: Vec<Invite>,
}

impl ResolvedAudience {
    pub fn is_empty(&self) -> bool {
        self.attendees.is_empty() && self.invites.is_empty()
    }

    /// Number of message records a fan-out over this audience writes.
    pub fn len(&self) -> usize {
        self.attendees.len() + self.invites.len()
    }
}

/// Resolve the recipients of a broadcast.
///
/// - `All`: every attendee, plus every invite as a queue target.
/// - `Accepted`: attendees accepted through either signal; nothing queued.
/// - `Invited`: no attendees; every invite as a queue target.
///
/// An accepted invite whose attendee record already exists is never queued:
/// its promotion has already run. Under `Invited` that attendee becomes a
/// delivery target instead; under `All` the attendee is already one.
pub async fn resolve_audience(
    store: &dyn MessageStore,
    event_id: Uuid,
    selector: AudienceSelector,
) -> Result<ResolvedAudience, StoreError> {
    let audience = match selector {
        AudienceSelector::All => {
            let attendees = store.list_attendees(event_id).await?;
            let invites = store.list_invites(event_id).await?;
            let (_, invites) = split_onboarded_invites(invites, &attendees);
            ResolvedAudience { attendees, invites }
        }
        AudienceSelector::Accepted => {
            let attendees = store.list_attendees(event_id).await?;
            let invites = store.list_invites(event_id).await?;
            ResolvedAudience {
                attendees: select_accepted_attendees(attendees, &invites),
                invites: Vec::new(),
            }
        }
        AudienceSelector::Invited => {
            let attendees = store.list_attendees(event_id).await?;
            let invites = store.list_invites(event_id).await?;
            let (onboarded, invites) = split_onboarded_invites(invites, &attendees);
            ResolvedAudience {
                attendees: onboarded,
                invites,
            }
        }
    };

    tracing::debug!(
        event_id = %event_id,
        audience = %selector,
        attendees = audience.attendees.len(),
        invites = audience.invites.len(),
        "Resolved broadcast audience"
    );

    Ok(audience)
}

/// The attendee record an accepted invite maps to, if it exists yet.
pub fn find_invitee<'a>(invite: &Invite, attendees: &'a [Attendee]) -> Option<&'a Attendee> {
    if !invite.is_accepted() {
        return None;
    }
    let email = shared::validation::normalize_email(&invite.email);
    attendees.iter().find(|attendee| {
        attendee.event_id == invite.event_id
            && shared::validation::normalize_email(&attendee.email) == email
    })
}

/// Separate accepted invites that already map to an attendee from those
/// that still need a queued copy.
///
/// Returns the mapped attendees (deduplicated) and the remaining invites.
fn split_onboarded_invites(
    invites: Vec<Invite>,
    attendees: &[Attendee],
) -> (Vec<Attendee>, Vec<Invite>) {
    let mut seen = HashSet::new();
    let mut onboarded = Vec::new();
    let mut pending = Vec::new();

    for invite in invites {
        match find_invitee(&invite, attendees) {
            Some(attendee) => {
                if seen.insert(attendee.id) {
                    onboarded.push(attendee.clone());
                }
            }
            None => pending.push(invite),
        }
    }

    (onboarded, pending)
}

/// Keep attendees that accepted through either signal.
///
/// An attendee counts as accepted when its own `accepted_at` is set, or when
/// an accepted invite exists for the same (normalized) email. Neither signal
/// is authoritative on its own, so the result is their union.
pub fn select_accepted_attendees(attendees: Vec<Attendee>, invites: &[Invite]) -> Vec<Attendee> {
    let accepted_emails: HashSet<String> = invites
        .iter()
        .filter(|invite| invite.is_accepted())
        .map(|invite| shared::validation::normalize_email(&invite.email))
        .collect();

    attendees
        .into_iter()
        .filter(|attendee| {
            attendee.has_accepted()
                || accepted_emails.contains(&shared::validation::normalize_email(&attendee.email))
        })
        .collect()
}
