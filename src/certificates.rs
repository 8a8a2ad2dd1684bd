use chrono::{Duration, NaiveDate};

use crate::models::{CertificateCounts, StudentRecord};

pub const WINDOWS: [u32; 3] = [7, 30, 90];

/// Supplies certificate request counts for a trailing window of days.
pub trait CertificateCounter {
    fn request_count(&self, window_days: u32) -> u64;

    fn counts(&self) -> CertificateCounts {
        CertificateCounts {
            solicitacoes_7d: self.request_count(WINDOWS[0]),
            solicitacoes_30d: self.request_count(WINDOWS[1]),
            solicitacoes_90d: self.request_count(WINDOWS[2]),
        }
    }
}

/// Counts digital and printed certificate requests dated inside the window.
///
/// A request dated `today - window_days` or later, and not after `today`,
/// counts, so a window of N days spans N+1 calendar days inclusive. Windows
/// reaching past the earliest representable date count every dated request.
/// Each certificate kind counts once per student.
pub struct RequestDateCounter {
    dates: Vec<NaiveDate>,
    today: NaiveDate,
}

impl RequestDateCounter {
    pub fn new(records: &[StudentRecord], today: NaiveDate) -> Self {
        let dates = records
            .iter()
            .flat_map(|record| [&record.data_solic_digital, &record.data_solic_impresso])
            .filter_map(|value| value.as_deref().and_then(parse_sheet_date))
            .collect();

        Self { dates, today }
    }
}

impl CertificateCounter for RequestDateCounter {
    fn request_count(&self, window_days: u32) -> u64 {
        let start = self
            .today
            .checked_sub_signed(Duration::days(i64::from(window_days)))
            .unwrap_or(NaiveDate::MIN);
        self.dates
            .iter()
            .filter(|date| **date >= start && **date <= self.today)
            .count() as u64
    }
}

/// Sheet dates are `dd/mm/yyyy`, sometimes ISO `yyyy-mm-dd`, optionally with a time suffix.
pub fn parse_sheet_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y-%m-%d"))
        .ok()
}
