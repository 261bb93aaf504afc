use std::sync::Arc;

use uuid::Uuid;
use wayfare_core::repository::{BoxError, NewParticipant, ParticipantRepository};
use wayfare_shared::models::Address;

use crate::validate::ParticipantPayload;

/// Writes the participant batch for a booking. Participants are a mandatory
/// extension of the booking: any failure here makes the caller tear the
/// booking down again.
pub struct ParticipantWriter {
    participants: Arc<dyn ParticipantRepository>,
}

impl ParticipantWriter {
    pub fn new(participants: Arc<dyn ParticipantRepository>) -> Self {
        Self { participants }
    }

    /// Map validated payloads to rows, defaulting each participant to the
    /// booking contact's address when they have none of their own.
    pub fn rows(contact_address: &Address, payloads: &[ParticipantPayload]) -> Vec<NewParticipant> {
        payloads
            .iter()
            .map(|payload| NewParticipant {
                first_name: payload.first_name.clone(),
                last_name: payload.last_name.clone(),
                national_id: payload.national_id.clone(),
                email: payload.email.clone(),
                phone: payload.phone.clone(),
                document_type: payload.document_type.clone(),
                document_number: payload.document_number.clone(),
                address: payload
                    .address
                    .clone()
                    .map(|address| address.into_address())
                    .unwrap_or_else(|| contact_address.clone()),
            })
            .collect()
    }

    pub async fn insert(
        &self,
        booking_id: Uuid,
        rows: &[NewParticipant],
    ) -> Result<(), BoxError> {
        self.participants.insert_batch(booking_id, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::AddressPayload;

    fn contact_address() -> Address {
        Address {
            street: "Polna 12".to_string(),
            city: "Warszawa".to_string(),
            zip: "00-625".to_string(),
        }
    }

    fn payload(address: Option<AddressPayload>) -> ParticipantPayload {
        ParticipantPayload {
            first_name: "Jan".to_string(),
            last_name: "Nowak".to_string(),
            national_id: Some("90010112345".to_string()),
            email: None,
            phone: None,
            document_type: None,
            document_number: None,
            address,
        }
    }

    #[test]
    fn test_participant_inherits_contact_address() {
        let rows = ParticipantWriter::rows(&contact_address(), &[payload(None)]);
        assert_eq!(rows[0].address, contact_address());
    }

    #[test]
    fn test_participant_keeps_own_address() {
        let own = AddressPayload {
            street: "Lipowa 3".to_string(),
            city: "Krakow".to_string(),
            zip: "30-001".to_string(),
        };
        let rows = ParticipantWriter::rows(&contact_address(), &[payload(Some(own))]);
        assert_eq!(rows[0].address.street, "Lipowa 3");
    }
}
