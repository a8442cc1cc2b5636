//! Per-slot status classification.
//!
//! Slot 1 trusts the real-time estimate and flags it as delayed when it runs
//! later than the printed schedule in the remark. Slots 2 and 3 prefer the
//! printed schedule and only fall back to the real-time estimate.

use chrono::{FixedOffset, NaiveDate};

use crate::domain::{
    EtaRecord, EtaSlot, ReconciledBoard, SlotStatus, extract_scheduled_time, format_hhmm,
};

/// Classify one accepted record into its slot.
///
/// `today` is the date the remark's `HH:MM` is placed on for the delay
/// comparison.
pub fn classify(record: &EtaRecord, today: NaiveDate, offset: FixedOffset) -> EtaSlot {
    let scheduled = record.remark.as_deref().and_then(extract_scheduled_time);

    let (status, display_time, delayed) = if record.sequence_number == 1 {
        match (record.real_time, scheduled) {
            (Some(real_time), scheduled) => {
                let delayed = scheduled
                    .and_then(|s| s.on(today, offset))
                    .is_some_and(|s| real_time > s);
                (
                    SlotStatus::RealTime,
                    Some(format_hhmm(&real_time, offset)),
                    delayed,
                )
            }
            (None, Some(s)) => (SlotStatus::Scheduled, Some(s.to_string()), false),
            (None, None) => (SlotStatus::Cancelled, None, false),
        }
    } else {
        match (scheduled, record.real_time) {
            (Some(s), _) => (SlotStatus::Scheduled, Some(s.to_string()), false),
            (None, Some(real_time)) => (
                SlotStatus::RealTime,
                Some(format_hhmm(&real_time, offset)),
                false,
            ),
            (None, None) => (SlotStatus::Cancelled, None, false),
        }
    };

    EtaSlot {
        index: record.sequence_number,
        status,
        display_time,
        delayed,
        service_type: Some(record.service_type.clone()),
        remark: record.remark.clone(),
    }
}

/// Place records into their slots; positions with no record are
/// `NoEstimate`. Records must already be one per sequence number.
pub fn build_board(
    records: &[EtaRecord],
    today: NaiveDate,
    offset: FixedOffset,
) -> ReconciledBoard {
    let mut slots = [
        EtaSlot::no_estimate(1),
        EtaSlot::no_estimate(2),
        EtaSlot::no_estimate(3),
    ];

    for record in records {
        slots[record.slot_index()] = classify(record, today, offset);
    }

    ReconciledBoard::new(slots)
}
