use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BookingError;
use crate::models::{
    BookingRequest, BookingStep, BookingSummary, ContactDetails, PriceTables, TripDraft,
};
use crate::pricing::{compute_total, duration_days, quote};

pub const MIN_ADULTS: u32 = 1;
pub const MAX_ADULTS: u32 = 8;
pub const MAX_CHILDREN: u32 = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// State of the four-step booking form.
///
/// Every update consumes the wizard and hands back the new state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWizard {
    pub step: BookingStep,
    pub draft: TripDraft,
    pub contact: ContactDetails,
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingWizard {
    pub fn new() -> Self {
        Self {
            step: BookingStep::TripDetails,
            draft: TripDraft::default(),
            contact: ContactDetails::default(),
        }
    }

    pub fn from_parts(step: BookingStep, draft: TripDraft, contact: ContactDetails) -> Self {
        Self {
            step,
            draft,
            contact,
        }
    }

    pub fn next_step(mut self) -> Self {
        self.step = self.step.next();
        self
    }

    pub fn prev_step(mut self) -> Self {
        self.step = self.step.prev();
        self
    }

    pub fn with_destination(mut self, id: impl Into<String>) -> Self {
        self.draft.destination_id = Some(id.into());
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.draft.start_date = start;
        self.draft.end_date = end;
        self
    }

    pub fn with_adults(mut self, adults: u32) -> Self {
        self.draft.party_size = adults;
        self
    }

    pub fn with_children(mut self, children: u32) -> Self {
        self.draft.children = children;
        self
    }

    pub fn with_accommodation(mut self, tier: impl Into<String>) -> Self {
        self.draft.accommodation_tier = Some(tier.into());
        self
    }

    pub fn with_contact(mut self, contact: ContactDetails) -> Self {
        self.contact = contact;
        self
    }

    pub fn toggle_activity(mut self, id: &str, checked: bool) -> Self {
        if checked {
            self.draft.selected_activities.insert(id.to_string());
        } else {
            self.draft.selected_activities.remove(id);
        }
        self
    }

    /// Running estimate, shown once a destination and both dates are picked.
    pub fn estimate(&self, tables: &PriceTables) -> Option<u64> {
        let ready = self.draft.destination_id.is_some()
            && self.draft.start_date.is_some()
            && self.draft.end_date.is_some();
        ready.then(|| compute_total(&self.draft, tables))
    }

    pub fn is_activity_checked(&self, tables: &PriceTables, id: &str) -> bool {
        let included = tables
            .activity(id)
            .map(|activity| activity.charge.is_included())
            .unwrap_or(false);
        included || self.draft.selected_activities.contains(id)
    }

    pub fn summary(&self, tables: &PriceTables) -> BookingSummary {
        let draft = &self.draft;
        BookingSummary {
            destination: draft
                .destination_id
                .as_deref()
                .and_then(|id| tables.destination(id))
                .map(|entry| entry.label.clone()),
            start_date: draft.start_date,
            end_date: draft.end_date,
            duration_days: duration_days(draft).unwrap_or(0),
            adults: draft.party_size,
            children: draft.children,
            accommodation: draft
                .accommodation_tier
                .as_deref()
                .and_then(|id| tables.accommodation(id))
                .map(|entry| entry.label.clone()),
            activities_selected: draft.selected_activities.len(),
            total: compute_total(draft, tables),
        }
    }

    pub fn submit(&self, tables: &PriceTables) -> Result<BookingRequest, BookingError> {
        if self.step != BookingStep::Review {
            return Err(BookingError::NotOnReview(self.step));
        }

        validate_party(&self.draft)?;
        validate_contact(&self.contact)?;
        let quote = quote(&self.draft, tables)?;

        Ok(BookingRequest {
            reference: Uuid::new_v4(),
            submitted_at: Utc::now(),
            draft: self.draft.clone(),
            contact: self.contact.clone(),
            quote,
        })
    }
}

fn validate_party(draft: &TripDraft) -> Result<(), BookingError> {
    if !(MIN_ADULTS..=MAX_ADULTS).contains(&draft.party_size) {
        return Err(BookingError::AdultsOutOfRange {
            value: draft.party_size,
            min: MIN_ADULTS,
            max: MAX_ADULTS,
        });
    }
    if draft.children > MAX_CHILDREN {
        return Err(BookingError::ChildrenOutOfRange {
            value: draft.children,
            max: MAX_CHILDREN,
        });
    }
    Ok(())
}

pub fn validate_contact(contact: &ContactDetails) -> Result<(), BookingError> {
    let required = [
        ("first_name", &contact.first_name),
        ("last_name", &contact.last_name),
        ("email", &contact.email),
        ("phone", &contact.phone),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(BookingError::MissingContactField(field));
        }
    }

    if !EMAIL_RE.is_match(contact.email.trim()) {
        return Err(BookingError::InvalidEmail(contact.email.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;

    fn contact() -> ContactDetails {
        ContactDetails {
            first_name: "Wanjiru".to_string(),
            last_name: "Kamau".to_string(),
            email: "wanjiru@example.com".to_string(),
            phone: "+254 711 000 111".to_string(),
            nationality: "Kenyan".to_string(),
            special_requests: String::new(),
        }
    }

    fn filled() -> BookingWizard {
        let start = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 8, 14).unwrap();
        BookingWizard::new()
            .with_destination("amboseli")
            .with_dates(Some(start), Some(end))
            .with_accommodation("luxury")
            .toggle_activity("cultural-visit", true)
            .with_contact(contact())
    }

    #[test]
    fn estimate_waits_for_destination_and_dates() {
        let tables = PriceTables::default();
        let wizard = BookingWizard::new().with_destination("tsavo");
        assert_eq!(wizard.estimate(&tables), None);

        // (280 + 400) * 4 * 2 + 60 * 2
        assert_eq!(filled().estimate(&tables), Some(5560));
    }

    #[test]
    fn toggling_activities_round_trips() {
        let tables = PriceTables::default();
        let wizard = filled();
        let before = wizard.estimate(&tables);

        let wizard = wizard
            .toggle_activity("game-drives", true)
            .toggle_activity("game-drives", false);
        assert_eq!(wizard.estimate(&tables), before);
        assert!(wizard.is_activity_checked(&tables, "game-drives"));

        let wizard = wizard.toggle_activity("cultural-visit", false);
        assert!(!wizard.is_activity_checked(&tables, "cultural-visit"));
        assert_eq!(wizard.estimate(&tables), Some(5440));
    }

    #[test]
    fn submit_only_from_review() {
        let tables = PriceTables::default();
        let wizard = filled().next_step();
        assert_eq!(
            wizard.submit(&tables).unwrap_err(),
            BookingError::NotOnReview(BookingStep::Travelers)
        );

        let wizard = wizard.next_step().next_step().next_step();
        assert_eq!(wizard.step, BookingStep::Review);
        let request = wizard.submit(&tables).unwrap();
        assert_eq!(request.quote.total, 5560);
        assert_eq!(request.contact.last_name, "Kamau");
    }

    #[test]
    fn submit_validates_contact_and_party() {
        let tables = PriceTables::default();
        let review = |wizard: BookingWizard| wizard.next_step().next_step().next_step();

        let mut bad_contact = contact();
        bad_contact.email = "not-an-email".to_string();
        let err = review(filled().with_contact(bad_contact))
            .submit(&tables)
            .unwrap_err();
        assert_eq!(err.code(), "invalid_email");

        let err = review(filled().with_contact(ContactDetails::default()))
            .submit(&tables)
            .unwrap_err();
        assert_eq!(err, BookingError::MissingContactField("first_name"));

        let err = review(filled().with_adults(9)).submit(&tables).unwrap_err();
        assert_eq!(err.code(), "adults_out_of_range");

        let err = review(filled().with_children(7)).submit(&tables).unwrap_err();
        assert_eq!(err.code(), "children_out_of_range");
    }

    #[test]
    fn submit_surfaces_pricing_errors() {
        let tables = PriceTables::default();
        let wizard = filled()
            .with_destination("serengeti")
            .next_step()
            .next_step()
            .next_step();
        assert_eq!(
            wizard.submit(&tables).unwrap_err(),
            BookingError::Pricing(PricingError::UnknownDestination("serengeti".to_string()))
        );
    }

    #[test]
    fn summary_uses_labels() {
        let tables = PriceTables::default();
        let summary = filled().summary(&tables);
        assert_eq!(summary.destination.as_deref(), Some("Amboseli National Park"));
        assert_eq!(summary.accommodation.as_deref(), Some("Luxury Safari Resort"));
        assert_eq!(summary.duration_days, 4);
        assert_eq!(summary.activities_selected, 1);
        assert_eq!(summary.total, 5560);
    }
}
