use chrono::NaiveDate;
use thiserror::Error;

use crate::models::BookingStep;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("no destination selected")]
    MissingDestination,
    #[error("start and end dates are both required")]
    MissingDates,
    #[error("unknown destination: {0}")]
    UnknownDestination(String),
    #[error("unknown accommodation tier: {0}")]
    UnknownAccommodation(String),
    #[error("unknown activity: {0}")]
    UnknownActivity(String),
    #[error("end date {end} is before start date {start}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
    #[error("party must include at least one adult")]
    EmptyParty,
}

impl PricingError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingDestination => "missing_destination",
            Self::MissingDates => "missing_dates",
            Self::UnknownDestination(_) => "unknown_destination",
            Self::UnknownAccommodation(_) => "unknown_accommodation",
            Self::UnknownActivity(_) => "unknown_activity",
            Self::InvertedDateRange { .. } => "inverted_date_range",
            Self::EmptyParty => "empty_party",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("booking can only be submitted from the review step (currently {0:?})")]
    NotOnReview(BookingStep),
    #[error("adults must be between {min} and {max}, got {value}")]
    AdultsOutOfRange { value: u32, min: u32, max: u32 },
    #[error("children must be at most {max}, got {value}")]
    ChildrenOutOfRange { value: u32, max: u32 },
    #[error("contact field `{0}` is required")]
    MissingContactField(&'static str),
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl BookingError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotOnReview(_) => "not_on_review",
            Self::AdultsOutOfRange { .. } => "adults_out_of_range",
            Self::ChildrenOutOfRange { .. } => "children_out_of_range",
            Self::MissingContactField(_) => "missing_contact_field",
            Self::InvalidEmail(_) => "invalid_email",
            Self::Pricing(inner) => inner.code(),
        }
    }
}
