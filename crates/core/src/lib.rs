pub mod booking;
pub mod catalog;
pub mod error;
pub mod intent;
pub mod models;
pub mod pricing;

pub use booking::BookingWizard;
pub use catalog::{Catalog, DestinationListing, Post, ANY_CATEGORY};
pub use error::{BookingError, PricingError};
pub use intent::{
    exceeds_input_limit, match_intent, match_response, IntentMatch, ResponseTable,
    MAX_CHAT_INPUT_GRAPHEMES,
};
pub use models::*;
pub use pricing::{compute_total, duration_days, quote};
