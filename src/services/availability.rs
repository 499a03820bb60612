use chrono::{Datelike, Duration, NaiveDate};

use crate::errors::AppError;
use crate::models::{Slot, TimeRange};
use crate::services::ledger::{BookingLedger, WorkingHoursStore};
use crate::services::slots::generate_slots;

/// Sunday = 0, matching how working hours are stored.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Every slot the doctor offers on `date`, with `is_available` cleared where a
/// scheduled appointment overlaps it. Booked slots stay in the list so a
/// client can show them disabled; a day without working hours is empty.
pub fn get_available_slots<S>(
    store: &S,
    doctor_id: &str,
    date: NaiveDate,
    duration: Duration,
) -> Result<Vec<Slot>, AppError>
where
    S: WorkingHoursStore + BookingLedger + ?Sized,
{
    let hours = store.working_hours(doctor_id, weekday_index(date))?;
    if hours.is_empty() {
        return Ok(vec![]);
    }

    let ranges: Vec<TimeRange> = hours.iter().map(|h| h.range()).collect();
    let mut slots = generate_slots(&ranges, duration);

    for slot in &mut slots {
        let interval = slot.range().on(date);
        if !store.find_overlapping(doctor_id, date, &interval)?.is_empty() {
            slot.is_available = false;
        }
    }

    tracing::debug!(
        doctor_id,
        %date,
        total = slots.len(),
        open = slots.iter().filter(|s| s.is_available).count(),
        "resolved availability"
    );

    Ok(slots)
}
