//! Date windows anchored on anniversaries of "today".

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

use crate::domain::error::DomainError;

/// Days covered by a non-exact window, counted back from the anniversary.
pub const LOOKBACK_DAYS: i64 = 7;

/// A calendar range used to filter content by publish date.
///
/// Exclusive windows match dates strictly between `after` and `before`.
/// Inclusive windows also match both bounds, which is what makes an exact
/// window (`after == before`) match the anniversary day itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub before: Date,
    pub after: Date,
    pub inclusive: bool,
}

impl DateWindow {
    pub fn contains(&self, date: Date) -> bool {
        if self.inclusive {
            self.after <= date && date <= self.before
        } else {
            self.after < date && date < self.before
        }
    }
}

/// How multiple windows combine in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relation {
    #[default]
    Or,
    And,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateQuery {
    pub windows: Vec<DateWindow>,
    pub relation: Relation,
}

impl DateQuery {
    pub fn any_of(windows: Vec<DateWindow>) -> Self {
        Self {
            windows,
            relation: Relation::Or,
        }
    }

    /// An empty query matches nothing.
    pub fn matches(&self, date: Date) -> bool {
        if self.windows.is_empty() {
            return false;
        }
        match self.relation {
            Relation::Or => self.windows.iter().any(|window| window.contains(date)),
            Relation::And => self.windows.iter().all(|window| window.contains(date)),
        }
    }
}

/// Build one window per year offset `1..=years_back`, most recent year first.
pub fn build_windows(
    today: Date,
    years_back: u8,
    exact_match: bool,
) -> Result<Vec<DateWindow>, DomainError> {
    (1..=years_back)
        .map(|offset| {
            let before = years_before(today, offset)?;
            let after = if exact_match {
                before
            } else {
                before
                    .checked_sub(Duration::days(LOOKBACK_DAYS))
                    .ok_or_else(|| out_of_range(today, offset))?
            };
            Ok(DateWindow {
                before,
                after,
                inclusive: exact_match,
            })
        })
        .collect()
}

/// Subtract whole calendar years; 29 February lands on 1 March in non-leap years.
pub fn years_before(date: Date, years: u8) -> Result<Date, DomainError> {
    let year = date.year() - i32::from(years);
    Date::from_calendar_date(year, date.month(), date.day())
        .or_else(|_| Date::from_calendar_date(year, Month::March, 1))
        .map_err(|_| out_of_range(date, years))
}

fn out_of_range(date: Date, years: u8) -> DomainError {
    DomainError::invariant(format!(
        "date window for {date} minus {years} year(s) is out of range"
    ))
}
