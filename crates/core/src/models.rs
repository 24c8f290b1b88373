use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationRate {
    pub id: String,
    pub label: String,
    pub daily_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccommodationTier {
    pub id: String,
    pub label: String,
    pub daily_surcharge: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "price")]
pub enum ActivityCharge {
    Included,
    PerPerson(u32),
}

impl ActivityCharge {
    pub fn per_person(self) -> u32 {
        match self {
            Self::Included => 0,
            Self::PerPerson(price) => price,
        }
    }

    pub fn is_included(self) -> bool {
        matches!(self, Self::Included)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub label: String,
    pub charge: ActivityCharge,
}

/// Reference prices for the booking wizard. Built once and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTables {
    pub destinations: Vec<DestinationRate>,
    pub accommodations: Vec<AccommodationTier>,
    pub activities: Vec<Activity>,
}

impl PriceTables {
    pub fn destination(&self, id: &str) -> Option<&DestinationRate> {
        self.destinations.iter().find(|entry| entry.id == id)
    }

    pub fn accommodation(&self, id: &str) -> Option<&AccommodationTier> {
        self.accommodations.iter().find(|entry| entry.id == id)
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|entry| entry.id == id)
    }
}

impl Default for PriceTables {
    fn default() -> Self {
        Self {
            destinations: vec![
                destination("maasai-mara", "Maasai Mara National Reserve", 350),
                destination("amboseli", "Amboseli National Park", 280),
                destination("samburu", "Samburu National Reserve", 320),
                destination("tsavo", "Tsavo National Parks", 250),
                destination("nakuru", "Lake Nakuru National Park", 220),
                destination("combo", "Multi-Park Safari Package", 450),
            ],
            accommodations: vec![
                tier("budget", "Budget Safari Camp", 0),
                tier("mid-range", "Mid-Range Safari Lodge", 150),
                tier("luxury", "Luxury Safari Resort", 400),
                tier("ultra-luxury", "Ultra-Luxury Tented Camp", 800),
            ],
            activities: vec![
                activity("game-drives", "Game Drives", ActivityCharge::Included),
                activity("walking-safari", "Walking Safari", ActivityCharge::PerPerson(80)),
                activity("night-safari", "Night Safari", ActivityCharge::PerPerson(120)),
                activity(
                    "balloon-safari",
                    "Hot Air Balloon Safari",
                    ActivityCharge::PerPerson(450),
                ),
                activity(
                    "cultural-visit",
                    "Cultural Village Visit",
                    ActivityCharge::PerPerson(60),
                ),
                activity(
                    "photography-tour",
                    "Photography Workshop",
                    ActivityCharge::PerPerson(150),
                ),
            ],
        }
    }
}

/// In-progress booking configuration held by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripDraft {
    pub destination_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub party_size: u32,
    pub children: u32,
    pub accommodation_tier: Option<String>,
    pub selected_activities: BTreeSet<String>,
}

impl Default for TripDraft {
    fn default() -> Self {
        Self {
            destination_id: None,
            start_date: None,
            end_date: None,
            party_size: 2,
            children: 0,
            accommodation_tier: None,
            selected_activities: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub destination_id: String,
    pub accommodation_tier: Option<String>,
    pub duration_days: u64,
    pub party_size: u32,
    pub base: u64,
    pub accommodation_extra: u64,
    pub activities_extra: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub nationality: String,
    pub special_requests: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    TripDetails,
    Travelers,
    PersonalInfo,
    Review,
}

impl BookingStep {
    pub const ALL: [BookingStep; 4] = [
        Self::TripDetails,
        Self::Travelers,
        Self::PersonalInfo,
        Self::Review,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::TripDetails => 1,
            Self::Travelers => 2,
            Self::PersonalInfo => 3,
            Self::Review => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::TripDetails => "Trip Details",
            Self::Travelers => "Travelers",
            Self::PersonalInfo => "Personal Info",
            Self::Review => "Review",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::TripDetails => "Choose your safari preferences",
            Self::Travelers => "Tell us about your group",
            Self::PersonalInfo => "Your contact information",
            Self::Review => "Confirm your booking",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::TripDetails => Self::Travelers,
            Self::Travelers => Self::PersonalInfo,
            Self::PersonalInfo | Self::Review => Self::Review,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::TripDetails | Self::Travelers => Self::TripDetails,
            Self::PersonalInfo => Self::Travelers,
            Self::Review => Self::PersonalInfo,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSummary {
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration_days: u64,
    pub adults: u32,
    pub children: u32,
    pub accommodation: Option<String>,
    pub activities_selected: usize,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub reference: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub draft: TripDraft,
    pub contact: ContactDetails,
    pub quote: Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    #[serde(with = "author_flag", rename = "is_bot")]
    pub author: Author,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn is_bot(&self) -> bool {
        self.author == Author::Bot
    }
}

mod author_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Author;

    pub fn serialize<S: Serializer>(author: &Author, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(*author == Author::Bot)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Author, D::Error> {
        Ok(if bool::deserialize(deserializer)? {
            Author::Bot
        } else {
            Author::User
        })
    }
}

fn destination(id: &str, label: &str, daily_rate: u32) -> DestinationRate {
    DestinationRate {
        id: id.to_string(),
        label: label.to_string(),
        daily_rate,
    }
}

fn tier(id: &str, label: &str, daily_surcharge: u32) -> AccommodationTier {
    AccommodationTier {
        id: id.to_string(),
        label: label.to_string(),
        daily_surcharge,
    }
}

fn activity(id: &str, label: &str, charge: ActivityCharge) -> Activity {
    Activity {
        id: id.to_string(),
        label: label.to_string(),
        charge,
    }
}
