use crate::model::Provider;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Excluded,
    DoubleBooking,
    DuplicateSlot,
    OffDay,
    OutOfRange,
    UnknownDuty,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Excluded => "excluded",
            ViolationKind::DoubleBooking => "double",
            ViolationKind::DuplicateSlot => "duplicate",
            ViolationKind::OffDay => "off-day",
            ViolationKind::OutOfRange => "out-of-range",
            ViolationKind::UnknownDuty => "unknown-duty",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub date: NaiveDate,
    pub duty: String,
    pub provider: Provider,
    pub kind: ViolationKind,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("duty type {0} has no eligible weekday")]
    EmptyDutyType(String),
    #[error("duty type {0} is declared twice")]
    DuplicateDutyType(String),
    #[error("invalid weekday: {0}")]
    InvalidWeekday(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("unknown duty type: {0}")]
    UnknownDuty(String),
    #[error("no {duty} slot on {date}")]
    UnknownSlot { date: NaiveDate, duty: String },
    #[error("reassign invalid: {0}")]
    ReassignInvalid(&'static str),
    #[error("swap invalid: {0}")]
    SwapInvalid(&'static str),
}
