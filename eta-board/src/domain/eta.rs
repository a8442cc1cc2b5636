//! Arrival records and the reconciled three-slot board.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Number of upcoming arrivals on a board.
pub const BOARD_SLOTS: usize = 3;

/// One upcoming arrival as reported by a single service type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtaRecord {
    /// Rank among upcoming arrivals, always within `1..=BOARD_SLOTS`.
    pub sequence_number: u8,
    /// Real-time estimate, when the operator has one.
    pub real_time: Option<DateTime<FixedOffset>>,
    /// Free-text remark, possibly carrying a scheduled `HH:MM`.
    pub remark: Option<String>,
    /// Service type this record was fetched under.
    pub service_type: String,
}

impl EtaRecord {
    /// Returns `None` when `sequence_number` is outside the board range.
    pub fn new(
        sequence_number: u32,
        real_time: Option<DateTime<FixedOffset>>,
        remark: Option<String>,
        service_type: impl Into<String>,
    ) -> Option<Self> {
        if !Self::in_board_range(sequence_number) {
            return None;
        }

        Some(Self {
            sequence_number: sequence_number as u8,
            real_time,
            remark,
            service_type: service_type.into(),
        })
    }

    pub fn in_board_range(sequence_number: u32) -> bool {
        (1..=BOARD_SLOTS as u32).contains(&sequence_number)
    }

    /// Zero-based slot position.
    pub fn slot_index(&self) -> usize {
        usize::from(self.sequence_number) - 1
    }
}

/// How a slot's time was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    RealTime,
    Scheduled,
    Cancelled,
    NoEstimate,
}

/// One position on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtaSlot {
    /// 1-based, fixed by position.
    pub index: u8,
    pub status: SlotStatus,
    /// `HH:MM` shown to the rider.
    pub display_time: Option<String>,
    /// Only ever set on slot 1.
    pub delayed: bool,
    /// Service type the underlying record came from.
    pub service_type: Option<String>,
    pub remark: Option<String>,
}

impl EtaSlot {
    pub fn no_estimate(index: u8) -> Self {
        Self {
            index,
            status: SlotStatus::NoEstimate,
            display_time: None,
            delayed: false,
            service_type: None,
            remark: None,
        }
    }
}

/// Exactly three slots, indices 1, 2, 3 in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReconciledBoard {
    slots: [EtaSlot; BOARD_SLOTS],
}

impl ReconciledBoard {
    /// Build a board from per-position slots. Indices are reassigned from
    /// position so they can never disagree with order.
    pub fn new(mut slots: [EtaSlot; BOARD_SLOTS]) -> Self {
        for (i, slot) in slots.iter_mut().enumerate() {
            slot.index = i as u8 + 1;
        }
        Self { slots }
    }

    /// A board with nothing on it.
    pub fn empty() -> Self {
        Self::new([
            EtaSlot::no_estimate(1),
            EtaSlot::no_estimate(2),
            EtaSlot::no_estimate(3),
        ])
    }

    pub fn slots(&self) -> &[EtaSlot] {
        &self.slots
    }

    /// Slot by 1-based index.
    pub fn slot(&self, index: usize) -> Option<&EtaSlot> {
        index.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    /// Whether any slot carries an estimate (anything but `NoEstimate`).
    pub fn has_estimates(&self) -> bool {
        self.slots
            .iter()
            .any(|s| s.status != SlotStatus::NoEstimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_range() {
        assert!(EtaRecord::new(0, None, None, "1").is_none());
        assert!(EtaRecord::new(1, None, None, "1").is_some());
        assert!(EtaRecord::new(3, None, None, "1").is_some());
        assert!(EtaRecord::new(4, None, None, "1").is_none());
    }

    #[test]
    fn slot_index_is_zero_based() {
        let record = EtaRecord::new(2, None, None, "1").unwrap();
        assert_eq!(record.slot_index(), 1);
    }

    #[test]
    fn empty_board_has_three_no_estimate_slots() {
        let board = ReconciledBoard::empty();
        assert_eq!(board.slots().len(), 3);
        assert!(!board.has_estimates());
        for (i, slot) in board.slots().iter().enumerate() {
            assert_eq!(slot.index as usize, i + 1);
            assert_eq!(slot.status, SlotStatus::NoEstimate);
        }
    }

    #[test]
    fn indices_follow_position() {
        let board = ReconciledBoard::new([
            EtaSlot::no_estimate(3),
            EtaSlot::no_estimate(3),
            EtaSlot::no_estimate(3),
        ]);
        let indices: Vec<_> = board.slots().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn slot_lookup_is_one_based() {
        let board = ReconciledBoard::empty();
        assert!(board.slot(0).is_none());
        assert_eq!(board.slot(1).unwrap().index, 1);
        assert_eq!(board.slot(3).unwrap().index, 3);
        assert!(board.slot(4).is_none());
    }

    #[test]
    fn serializes_as_array() {
        let json = serde_json::to_value(ReconciledBoard::empty()).unwrap();
        let slots = json.as_array().unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0]["status"], "no_estimate");
    }
}
