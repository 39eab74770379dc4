//! Breeding lifecycle state machine and date arithmetic.
//!
//! Models the reproductive thread of a dam: semination, the pregnancy check
//! 15 days later, delivery roughly 9 months after semination, and calf
//! separation 15 days after delivery. The functions here are pure; the
//! transactional application of an event's side effects lives in the
//! `herdbook-breeding` crate.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Interval constants
// ---------------------------------------------------------------------------

/// Days between semination and the pregnancy check.
pub const PREGNANCY_CHECK_WAIT_DAYS: u64 = 15;

/// Calendar months of gestation used to derive the expected delivery date.
pub const GESTATION_MONTHS: u32 = 9;

/// Days a calf stays with the dam before separation is allowed.
pub const SEPARATION_WAIT_DAYS: u64 = 15;

/// Look-ahead window for the upcoming-delivery milestone sweep.
pub const DELIVERY_MILESTONE_WINDOW_DAYS: u64 = 7;

// ---------------------------------------------------------------------------
// Date arithmetic
// ---------------------------------------------------------------------------

/// The date on which a semination's pregnancy check falls due.
///
/// Fixed at record creation and never recomputed.
pub fn check_date(semination_date: NaiveDate) -> NaiveDate {
    semination_date
        .checked_add_days(Days::new(PREGNANCY_CHECK_WAIT_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Expected delivery date: semination date plus nine calendar months.
///
/// Month addition clamps to the end of the target month (e.g. a May 31
/// semination expects delivery on the last day of February).
pub fn expected_delivery_date(semination_date: NaiveDate) -> NaiveDate {
    semination_date
        .checked_add_months(Months::new(GESTATION_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}

/// First date on which the calf may be separated from the dam.
pub fn separation_eligible_on(actual_delivery_date: NaiveDate) -> NaiveDate {
    actual_delivery_date
        .checked_add_days(Days::new(SEPARATION_WAIT_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Validate the separation waiting period.
///
/// Returns `TooEarly` carrying the eligible date when fewer than
/// [`SEPARATION_WAIT_DAYS`] days have passed since delivery.
pub fn validate_separation_date(
    today: NaiveDate,
    actual_delivery_date: NaiveDate,
) -> Result<(), CoreError> {
    let eligible_on = separation_eligible_on(actual_delivery_date);
    if today < eligible_on {
        return Err(CoreError::TooEarly { eligible_on });
    }
    Ok(())
}

/// Whole days from `today` until `date` (negative when `date` is past).
pub fn days_until(today: NaiveDate, date: NaiveDate) -> i64 {
    (date - today).num_days()
}

// ---------------------------------------------------------------------------
// Cattle status
// ---------------------------------------------------------------------------

/// Lifecycle status stored in `cattle.status`.
///
/// `Deceased` is a tombstone: cattle rows are never hard-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CattleStatus {
    Active,
    Pregnant,
    SeparatedPending,
    Deceased,
}

impl CattleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CattleStatus::Active => "ACTIVE",
            CattleStatus::Pregnant => "PREGNANT",
            CattleStatus::SeparatedPending => "SEPARATED_PENDING",
            CattleStatus::Deceased => "DECEASED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(CattleStatus::Active),
            "PREGNANT" => Some(CattleStatus::Pregnant),
            "SEPARATED_PENDING" => Some(CattleStatus::SeparatedPending),
            "DECEASED" => Some(CattleStatus::Deceased),
            _ => None,
        }
    }
}

impl std::fmt::Display for CattleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Pregnancy record status
// ---------------------------------------------------------------------------

/// Status of a pregnancy record. The machine is strictly linear:
///
/// ```text
/// IN_PROGRESS --delivery--> DELIVERED --separation--> SEPARATED
/// ```
///
/// There are no back-transitions; `Separated` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PregnancyStatus {
    InProgress,
    Delivered,
    Separated,
}

impl PregnancyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PregnancyStatus::InProgress => "IN_PROGRESS",
            PregnancyStatus::Delivered => "DELIVERED",
            PregnancyStatus::Separated => "SEPARATED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IN_PROGRESS" => Some(PregnancyStatus::InProgress),
            "DELIVERED" => Some(PregnancyStatus::Delivered),
            "SEPARATED" => Some(PregnancyStatus::Separated),
            _ => None,
        }
    }

    /// The single status reachable from `self`, or `None` for the terminal
    /// state.
    pub fn next(&self) -> Option<PregnancyStatus> {
        match self {
            PregnancyStatus::InProgress => Some(PregnancyStatus::Delivered),
            PregnancyStatus::Delivered => Some(PregnancyStatus::Separated),
            PregnancyStatus::Separated => None,
        }
    }

    pub fn can_transition(&self, to: PregnancyStatus) -> bool {
        self.next() == Some(to)
    }

    /// Validate a transition, producing the error surfaced to callers.
    pub fn validate_transition(&self, to: PregnancyStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::InvalidState(format!(
                "Pregnancy record cannot move from {self} to {to}"
            )))
        }
    }
}

impl std::fmt::Display for PregnancyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transition effects
// ---------------------------------------------------------------------------

/// A lifecycle event on a dam's reproductive thread.
///
/// Each variant carries the state the engine observed under the transaction,
/// so [`effects_for`] can be a pure function of the event alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A new semination was recorded while the dam had the given status.
    /// `has_open_pregnancy` is true when an IN_PROGRESS pregnancy record
    /// exists for the dam.
    SeminationRecorded {
        dam_status: CattleStatus,
        has_open_pregnancy: bool,
    },
    /// The pregnancy check outcome was recorded.
    CheckRecorded { is_pregnant: bool },
    /// A delivery was recorded on an IN_PROGRESS pregnancy.
    DeliveryRecorded,
    /// Separation was marked on a DELIVERED pregnancy whose calf currently
    /// has the given status.
    SeparationMarked { calf_status: CattleStatus },
}

/// The full set of side effects one lifecycle event implies, beyond the
/// update of the triggering record itself.
///
/// Returned as a description so the engine can apply everything at a single
/// call site inside one transaction, instead of scattering status writes
/// through unrelated operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionEffects {
    /// New status for the dam, when the event changes it.
    pub dam_status: Option<CattleStatus>,
    /// New status for the calf: the newborn's initial status at delivery, or
    /// the promotion applied at separation.
    pub calf_status: Option<CattleStatus>,
    /// The event opens a pregnancy record (positive check).
    pub opens_pregnancy: bool,
    /// The event creates the calf's registry entry (delivery).
    pub registers_calf: bool,
}

/// Compute the side effects of a lifecycle event.
pub fn effects_for(event: LifecycleEvent) -> TransitionEffects {
    match event {
        LifecycleEvent::SeminationRecorded {
            dam_status,
            has_open_pregnancy,
        } => {
            // A dam flagged PREGNANT without an in-progress pregnancy record
            // is inconsistent data; recording a fresh semination repairs it.
            let repair = dam_status == CattleStatus::Pregnant && !has_open_pregnancy;
            TransitionEffects {
                dam_status: repair.then_some(CattleStatus::Active),
                ..Default::default()
            }
        }
        LifecycleEvent::CheckRecorded { is_pregnant: true } => TransitionEffects {
            dam_status: Some(CattleStatus::Pregnant),
            opens_pregnancy: true,
            ..Default::default()
        },
        LifecycleEvent::CheckRecorded { is_pregnant: false } => TransitionEffects::default(),
        LifecycleEvent::DeliveryRecorded => TransitionEffects {
            dam_status: Some(CattleStatus::Active),
            calf_status: Some(CattleStatus::SeparatedPending),
            registers_calf: true,
            ..Default::default()
        },
        LifecycleEvent::SeparationMarked { calf_status } => TransitionEffects {
            // Only a calf still in its dependency period is promoted.
            calf_status: (calf_status == CattleStatus::SeparatedPending)
                .then_some(CattleStatus::Active),
            ..Default::default()
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
