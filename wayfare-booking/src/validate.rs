use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};
use wayfare_shared::models::{Address, CompanyDetails, ConsentRecord, ContactDetails};

/// Street address block required on every booking
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AddressPayload {
    #[validate(length(min = 3, message = "street is too short"))]
    pub street: String,
    #[validate(length(min = 2, message = "city is too short"))]
    pub city: String,
    #[validate(length(min = 4, message = "zip code is too short"))]
    pub zip: String,
}

impl AddressPayload {
    pub fn into_address(self) -> Address {
        Address {
            street: self.street,
            city: self.city,
            zip: self.zip,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ParticipantPayload {
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    /// 11-digit national identification number. Required for individual
    /// bookings; optional under company bookings, but format-checked
    /// whenever present.
    #[validate(custom(function = national_id_format))]
    pub national_id: Option<String>,
    #[validate(email(message = "invalid participant email"))]
    pub email: Option<String>,
    #[validate(length(min = 7, message = "participant phone is too short"))]
    pub phone: Option<String>,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    #[validate(nested)]
    pub address: Option<AddressPayload>,
}

/// Consent flags; each one must be literally true for the request to pass
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsentPayload {
    #[serde(default)]
    pub data_processing: bool,
    #[serde(default)]
    pub terms: bool,
    #[serde(default)]
    pub conditions: bool,
}

/// The customer-facing booking submission, as posted by the public page
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(length(min = 1, message = "trip slug is required"))]
    pub slug: String,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    #[validate(email(message = "invalid contact email"))]
    pub contact_email: String,
    #[validate(length(min = 7, message = "contact phone is too short"))]
    pub contact_phone: String,
    #[validate(nested)]
    pub address: AddressPayload,
    pub company_name: Option<String>,
    #[validate(custom(function = nip_format))]
    pub company_nip: Option<String>,
    pub company_address: Option<String>,
    #[validate(length(min = 1, message = "at least one participant is required"), nested)]
    pub participants: Vec<ParticipantPayload>,
    #[serde(default)]
    pub consents: ConsentPayload,
    #[serde(default)]
    pub with_payment: bool,
}

impl BookingRequest {
    pub fn is_company_booking(&self) -> bool {
        self.company_nip.is_some() || self.company_name.is_some()
    }

    pub fn contact_details(&self) -> ContactDetails {
        ContactDetails {
            first_name: self.contact_first_name.clone(),
            last_name: self.contact_last_name.clone(),
            email: self.contact_email.clone().into(),
            phone: self.contact_phone.clone().into(),
            address: self.address.clone().into_address(),
        }
    }

    pub fn company_details(&self) -> Option<CompanyDetails> {
        let nip = self.company_nip.clone()?;
        Some(CompanyDetails {
            name: self.company_name.clone().unwrap_or_default(),
            nip,
            address: self.company_address.clone(),
        })
    }

    /// Consent record stamped with the acceptance time. Only call after
    /// validation has confirmed all three flags.
    pub fn consent_record(&self) -> ConsentRecord {
        ConsentRecord {
            data_processing: self.consents.data_processing,
            terms: self.consents.terms,
            conditions: self.consents.conditions,
            accepted_at: Utc::now(),
        }
    }
}

fn all_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

fn national_id_format(value: &str) -> Result<(), ValidationError> {
    if all_digits(value, 11) {
        Ok(())
    } else {
        let mut error = ValidationError::new("national_id_format");
        error.message = Some("national id must be exactly 11 digits".into());
        Err(error)
    }
}

fn nip_format(value: &str) -> Result<(), ValidationError> {
    if all_digits(value, 10) {
        Ok(())
    } else {
        let mut error = ValidationError::new("nip_format");
        error.message = Some("tax id must be exactly 10 digits".into());
        Err(error)
    }
}

/// Full request validation: derive-level field checks plus the cross-field
/// rules (required-true consents, company tax id, national ids required on
/// individual bookings). Runs before any side effect.
pub fn validate_request(request: &BookingRequest) -> Result<(), ValidationErrors> {
    let mut errors = match request.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    if !(request.consents.data_processing && request.consents.terms && request.consents.conditions)
    {
        let mut error = ValidationError::new("consent_required");
        error.message = Some("all consents must be accepted".into());
        errors.add("consents", error);
    }

    if request.company_name.is_some() && request.company_nip.is_none() {
        let mut error = ValidationError::new("nip_required");
        error.message = Some("company bookings require a tax id".into());
        errors.add("company_nip", error);
    }

    // Individual bookings require a national id per participant; company
    // bookings relax this.
    if !request.is_company_booking() {
        for (index, participant) in request.participants.iter().enumerate() {
            if participant.national_id.is_none() {
                let mut error = ValidationError::new("national_id_required");
                error.message = Some("participant national id is required".into());
                error.add_param("index".into(), &index);
                errors.add("national_id", error);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
