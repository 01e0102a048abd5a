//! Data retrieval errors.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// A day that has not happened yet was requested.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{date} is in the future (today is {today})")]
pub struct DateInFuture {
    pub date: NaiveDate,
    pub today: NaiveDate,
}

/// Reject `date` if it falls after `today`.
pub fn ensure_not_future(date: NaiveDate, today: NaiveDate) -> Result<(), DateInFuture> {
    if date > today {
        return Err(DateInFuture { date, today });
    }
    Ok(())
}

/// Failure to produce a grid for a product/day.
///
/// `OutOfBounds` and `NotFound` mean there is nothing to render for that
/// product/day; the driver skips it instead of failing the run.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("{product} grid for {date} does not cover the cruise area {requested}")]
    OutOfBounds {
        product: String,
        date: String,
        requested: String,
    },

    #[error("grid file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unreadable grid file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("gave up on {} after {attempts} attempts: {last}", path.display())]
    Exhausted {
        path: PathBuf,
        attempts: u32,
        last: String,
    },
}

impl RetrievalError {
    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, RetrievalError::Corrupt { .. })
    }

    /// Whether the caller should skip the product/day rather than fail.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            RetrievalError::OutOfBounds { .. } | RetrievalError::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_future_dates_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(ensure_not_future(today, today).is_ok());
        assert!(ensure_not_future(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(), today).is_ok());

        let tomorrow = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(
            ensure_not_future(tomorrow, today),
            Err(DateInFuture { date: tomorrow, today })
        );
    }
}
