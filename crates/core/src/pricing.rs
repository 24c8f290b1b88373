use tracing::debug;

use crate::error::PricingError;
use crate::models::{PriceTables, Quote, TripDraft};

/// Whole days between the draft's dates, clamped at zero.
///
/// `None` when either date is missing.
pub fn duration_days(draft: &TripDraft) -> Option<u64> {
    let (start, end) = (draft.start_date?, draft.end_date?);
    Some((end - start).num_days().max(0) as u64)
}

/// Estimated total for a draft.
///
/// Unknown identifiers price at zero and a draft without both dates totals
/// zero. Use [`quote`] when the draft has to be validated.
pub fn compute_total(draft: &TripDraft, tables: &PriceTables) -> u64 {
    let Some(days) = duration_days(draft) else {
        return 0;
    };

    let daily_rate = match draft.destination_id.as_deref() {
        Some(id) => match tables.destination(id) {
            Some(entry) => entry.daily_rate,
            None => {
                debug!(destination = id, "unknown destination priced at zero");
                0
            }
        },
        None => 0,
    };
    let daily_surcharge = match draft.accommodation_tier.as_deref() {
        Some(id) => match tables.accommodation(id) {
            Some(entry) => entry.daily_surcharge,
            None => {
                debug!(tier = id, "unknown accommodation tier priced at zero");
                0
            }
        },
        None => 0,
    };
    let activities_per_person = draft
        .selected_activities
        .iter()
        .filter_map(|id| {
            let entry = tables.activity(id);
            if entry.is_none() {
                debug!(activity = %id, "unknown activity priced at zero");
            }
            entry
        })
        .map(|entry| u64::from(entry.charge.per_person()))
        .sum::<u64>();

    line_items(
        days,
        draft.party_size,
        daily_rate,
        daily_surcharge,
        activities_per_person,
    )
    .total()
}

/// Validated, itemized price for a complete draft.
pub fn quote(draft: &TripDraft, tables: &PriceTables) -> Result<Quote, PricingError> {
    let destination_id = draft
        .destination_id
        .as_deref()
        .ok_or(PricingError::MissingDestination)?;
    let destination = tables
        .destination(destination_id)
        .ok_or_else(|| PricingError::UnknownDestination(destination_id.to_string()))?;

    let (Some(start), Some(end)) = (draft.start_date, draft.end_date) else {
        return Err(PricingError::MissingDates);
    };
    if end < start {
        return Err(PricingError::InvertedDateRange { start, end });
    }

    if draft.party_size == 0 {
        return Err(PricingError::EmptyParty);
    }

    let daily_surcharge = match draft.accommodation_tier.as_deref() {
        Some(id) => {
            tables
                .accommodation(id)
                .ok_or_else(|| PricingError::UnknownAccommodation(id.to_string()))?
                .daily_surcharge
        }
        None => 0,
    };

    let mut activities_per_person = 0_u64;
    for id in &draft.selected_activities {
        let activity = tables
            .activity(id)
            .ok_or_else(|| PricingError::UnknownActivity(id.clone()))?;
        activities_per_person += u64::from(activity.charge.per_person());
    }

    let days = (end - start).num_days() as u64;
    let items = line_items(
        days,
        draft.party_size,
        destination.daily_rate,
        daily_surcharge,
        activities_per_person,
    );

    Ok(Quote {
        destination_id: destination.id.clone(),
        accommodation_tier: draft.accommodation_tier.clone(),
        duration_days: days,
        party_size: draft.party_size,
        base: items.base,
        accommodation_extra: items.accommodation_extra,
        activities_extra: items.activities_extra,
        total: items.total(),
    })
}

struct LineItems {
    base: u64,
    accommodation_extra: u64,
    activities_extra: u64,
}

impl LineItems {
    fn total(&self) -> u64 {
        self.base
            .saturating_add(self.accommodation_extra)
            .saturating_add(self.activities_extra)
    }
}

fn line_items(
    days: u64,
    party_size: u32,
    daily_rate: u32,
    daily_surcharge: u32,
    activities_per_person: u64,
) -> LineItems {
    let party = u64::from(party_size);
    let person_days = days.saturating_mul(party);

    LineItems {
        base: u64::from(daily_rate).saturating_mul(person_days),
        accommodation_extra: u64::from(daily_surcharge).saturating_mul(person_days),
        activities_extra: activities_per_person.saturating_mul(party),
    }
}
