//! Periodic note kinds and path resolution.
//!
//! Each enabled kind maps a calendar date to one note path via a configured
//! folder and a chrono format string. Quarterly formats may use the
//! `{quarter}` token, which chrono has no specifier for.

use std::fmt;
use std::fmt::Write as _;

use chrono::{Datelike, Days, Months, NaiveDate};
use thiserror::Error;

use crate::params::sanitize::NOTE_EXTENSION;

/// How many periods back `most_recent` scans before giving up.
pub const MOST_RECENT_HORIZON: usize = 730;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodKind {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 5] =
        [Self::Daily, Self::Weekly, Self::Monthly, Self::Quarterly, Self::Yearly];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// The route namespace serving this kind.
    #[must_use]
    pub fn namespace(self) -> &'static str {
        match self {
            Self::Daily => "daily-note",
            Self::Weekly => "weekly-note",
            Self::Monthly => "monthly-note",
            Self::Quarterly => "quarterly-note",
            Self::Yearly => "yearly-note",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PeriodicError {
    #[error("periodic notes are not configured for `{0}`")]
    Disabled(PeriodKind),

    #[error("invalid {kind} note filename format: {format}")]
    BadFormat { kind: PeriodKind, format: String },
}

/// Folder and filename format for one enabled kind.
#[derive(Debug, Clone)]
pub struct PeriodicKindConfig {
    pub folder: String,
    pub format: String,
}

/// The set of enabled periodic-note kinds for one vault.
#[derive(Debug, Clone, Default)]
pub struct PeriodicSet {
    kinds: Vec<(PeriodKind, PeriodicKindConfig)>,
}

impl PeriodicSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, kind: PeriodKind, config: PeriodicKindConfig) -> Self {
        self.kinds.retain(|(k, _)| *k != kind);
        self.kinds.push((kind, config));
        self
    }

    #[must_use]
    pub fn enabled(&self, kind: PeriodKind) -> bool {
        self.config(kind).is_some()
    }

    #[must_use]
    pub fn config(&self, kind: PeriodKind) -> Option<&PeriodicKindConfig> {
        self.kinds.iter().find(|(k, _)| *k == kind).map(|(_, c)| c)
    }

    /// The note path for the period containing `date`.
    pub fn path_for(&self, kind: PeriodKind, date: NaiveDate) -> Result<String, PeriodicError> {
        let config = self.config(kind).ok_or(PeriodicError::Disabled(kind))?;
        let name = format_date(&config.format, date).ok_or_else(|| PeriodicError::BadFormat {
            kind,
            format: config.format.clone(),
        })?;
        let folder = config.folder.trim_matches('/');
        if folder.is_empty() {
            Ok(format!("{name}.{NOTE_EXTENSION}"))
        } else {
            Ok(format!("{folder}/{name}.{NOTE_EXTENSION}"))
        }
    }

    /// The most recent existing note of this kind at or before `date`,
    /// scanning period by period up to a fixed horizon.
    pub fn most_recent(
        &self,
        kind: PeriodKind,
        date: NaiveDate,
        exists: &dyn Fn(&str) -> bool,
    ) -> Result<Option<String>, PeriodicError> {
        if !self.enabled(kind) {
            return Err(PeriodicError::Disabled(kind));
        }
        let mut current = date;
        for _ in 0..MOST_RECENT_HORIZON {
            let path = self.path_for(kind, current)?;
            if exists(&path) {
                return Ok(Some(path));
            }
            match step_back(kind, current) {
                Some(previous) => current = previous,
                None => break,
            }
        }
        Ok(None)
    }
}

/// Render `format` for `date`, substituting the `{quarter}` token before
/// handing the rest to chrono. Returns `None` when the format string is
/// invalid.
fn format_date(format: &str, date: NaiveDate) -> Option<String> {
    let quarter = date.month0() / 3 + 1;
    let format = format.replace("{quarter}", &quarter.to_string());
    let mut out = String::new();
    write!(out, "{}", date.format(&format)).ok()?;
    Some(out)
}

fn step_back(kind: PeriodKind, date: NaiveDate) -> Option<NaiveDate> {
    match kind {
        PeriodKind::Daily => date.checked_sub_days(Days::new(1)),
        PeriodKind::Weekly => date.checked_sub_days(Days::new(7)),
        PeriodKind::Monthly => date.checked_sub_months(Months::new(1)),
        PeriodKind::Quarterly => date.checked_sub_months(Months::new(3)),
        PeriodKind::Yearly => date.checked_sub_months(Months::new(12)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_set() -> PeriodicSet {
        PeriodicSet::new().with(
            PeriodKind::Daily,
            PeriodicKindConfig { folder: "daily".into(), format: "%Y-%m-%d".into() },
        )
    }

    #[test]
    fn path_for_formats_inside_folder() {
        let set = daily_set();
        assert_eq!(
            set.path_for(PeriodKind::Daily, date(2026, 8, 26)).unwrap(),
            "daily/2026-08-26.md"
        );
    }

    #[test]
    fn quarter_token_is_substituted() {
        let set = PeriodicSet::new().with(
            PeriodKind::Quarterly,
            PeriodicKindConfig { folder: "quarters".into(), format: "%Y-Q{quarter}".into() },
        );
        assert_eq!(
            set.path_for(PeriodKind::Quarterly, date(2026, 8, 26)).unwrap(),
            "quarters/2026-Q3.md"
        );
    }

    #[test]
    fn disabled_kind_is_an_error() {
        let set = daily_set();
        assert!(matches!(
            set.path_for(PeriodKind::Weekly, date(2026, 1, 1)),
            Err(PeriodicError::Disabled(PeriodKind::Weekly))
        ));
    }

    #[test]
    fn most_recent_steps_backwards() {
        let set = daily_set();
        let existing = "daily/2026-08-20.md";
        let found = set
            .most_recent(PeriodKind::Daily, date(2026, 8, 26), &|p| p == existing)
            .unwrap();
        assert_eq!(found.as_deref(), Some(existing));
    }

    #[test]
    fn most_recent_gives_up_at_horizon() {
        let set = daily_set();
        let found = set.most_recent(PeriodKind::Daily, date(2026, 8, 26), &|_| false).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn bad_format_is_reported_not_panicked() {
        let set = PeriodicSet::new().with(
            PeriodKind::Daily,
            PeriodicKindConfig { folder: "daily".into(), format: "%Q".into() },
        );
        assert!(matches!(
            set.path_for(PeriodKind::Daily, date(2026, 1, 1)),
            Err(PeriodicError::BadFormat { .. })
        ));
    }
}
