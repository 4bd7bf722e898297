use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, TimeZone, Utc};

use crate::model::DAY_MS;

/// Calendar boundary a timestamp can be aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapUnit {
    /// Midnight in the display time zone.
    Day,
    /// Monday midnight in the display time zone.
    Week,
    /// First of the month in the display time zone.
    Month,
    /// Midnight UTC, regardless of the display zone.
    UtcDay,
}

/// A snap unit bound to the time zone days are counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    pub unit: SnapUnit,
    pub offset: FixedOffset,
}

impl TimeGrid {
    pub fn new(unit: SnapUnit, offset: FixedOffset) -> Self {
        Self { unit, offset }
    }

    pub fn utc(unit: SnapUnit) -> Self {
        Self::new(unit, Utc.fix())
    }

    pub fn floor(&self, t: i64) -> i64 {
        floor_to(t, self.unit, self.offset)
    }

    pub fn ceil(&self, t: i64) -> i64 {
        ceil_to(t, self.unit, self.offset)
    }

    pub fn snap(&self, t: i64) -> i64 {
        snap(t, self.unit, self.offset)
    }

    /// Grid boundaries covering `[from, to]`, starting at or before `from`.
    pub fn boundaries(&self, from: i64, to: i64, limit: usize) -> Vec<i64> {
        let mut out = Vec::new();
        let mut t = self.floor(from);
        while t <= to && out.len() < limit {
            out.push(t);
            let next = next_boundary(t, self.unit, self.offset);
            if next <= t {
                break;
            }
            t = next;
        }
        out
    }
}

/// Build a fixed offset from minutes east of UTC, falling back to UTC.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

fn local_date(t: i64, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(t).map(|dt| dt.with_timezone(&offset).date_naive())
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Option<i64> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp_millis())
}

pub fn start_of_utc_day(t: i64) -> i64 {
    t.div_euclid(DAY_MS) * DAY_MS
}

/// Start of the unit containing `t`.
pub fn floor_to(t: i64, unit: SnapUnit, offset: FixedOffset) -> i64 {
    if unit == SnapUnit::UtcDay {
        return start_of_utc_day(t);
    }
    let Some(date) = local_date(t, offset) else {
        return t;
    };
    let first = match unit {
        SnapUnit::Day | SnapUnit::UtcDay => Some(date),
        SnapUnit::Week => {
            date.checked_sub_signed(Duration::days(date.weekday().num_days_from_monday() as i64))
        }
        SnapUnit::Month => date.with_day(1),
    };
    first.and_then(|d| local_midnight(d, offset)).unwrap_or(t)
}

/// First boundary strictly after the boundary `floor`.
fn next_boundary(floor: i64, unit: SnapUnit, offset: FixedOffset) -> i64 {
    let step_days = match unit {
        SnapUnit::UtcDay => return floor + DAY_MS,
        SnapUnit::Day => 1,
        SnapUnit::Week => 7,
        SnapUnit::Month => {
            let next = local_date(floor, offset).and_then(|d| {
                let (y, m) = if d.month() == 12 {
                    (d.year() + 1, 1)
                } else {
                    (d.year(), d.month() + 1)
                };
                NaiveDate::from_ymd_opt(y, m, 1)
            });
            return next
                .and_then(|d| local_midnight(d, offset))
                .unwrap_or(floor + 30 * DAY_MS);
        }
    };
    local_date(floor, offset)
        .and_then(|d| d.checked_add_signed(Duration::days(step_days)))
        .and_then(|d| local_midnight(d, offset))
        .unwrap_or(floor + step_days * DAY_MS)
}

/// Start of the next unit unless `t` already sits on a boundary.
pub fn ceil_to(t: i64, unit: SnapUnit, offset: FixedOffset) -> i64 {
    let floor = floor_to(t, unit, offset);
    if floor == t {
        t
    } else {
        next_boundary(floor, unit, offset)
    }
}

/// Nearest boundary; exact halves round down.
pub fn snap(t: i64, unit: SnapUnit, offset: FixedOffset) -> i64 {
    let floor = floor_to(t, unit, offset);
    if floor == t {
        return t;
    }
    let ceil = next_boundary(floor, unit, offset);
    if t - floor <= ceil - t {
        floor
    } else {
        ceil
    }
}

/// Saturday or Sunday in the display zone.
pub fn is_weekend(t: i64, offset: FixedOffset) -> bool {
    local_date(t, offset)
        .map(|d| d.weekday().num_days_from_monday() >= 5)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .map(|dt| dt.timestamp_millis())
            .unwrap()
    }

    #[test]
    fn test_floor_day_week_month() {
        let utc = Utc.fix();
        // 2024-05-15 is a Wednesday.
        let t = ms(2024, 5, 15, 13);
        assert_eq!(floor_to(t, SnapUnit::Day, utc), ms(2024, 5, 15, 0));
        assert_eq!(floor_to(t, SnapUnit::Week, utc), ms(2024, 5, 13, 0));
        assert_eq!(floor_to(t, SnapUnit::Month, utc), ms(2024, 5, 1, 0));
    }

    #[test]
    fn test_day_uses_display_offset() {
        let plus2 = offset_from_minutes(120);
        // 23:00 UTC is already the next day two hours east.
        let t = ms(2024, 5, 15, 23);
        assert_eq!(floor_to(t, SnapUnit::Day, plus2), ms(2024, 5, 15, 22));
        assert_eq!(floor_to(t, SnapUnit::UtcDay, plus2), ms(2024, 5, 15, 0));
    }

    #[test]
    fn test_snap_rounds_to_nearest() {
        let utc = Utc.fix();
        assert_eq!(snap(ms(2024, 5, 15, 11), SnapUnit::Day, utc), ms(2024, 5, 15, 0));
        assert_eq!(snap(ms(2024, 5, 15, 13), SnapUnit::Day, utc), ms(2024, 5, 16, 0));
        assert_eq!(snap(ms(2024, 12, 20, 0), SnapUnit::Month, utc), ms(2025, 1, 1, 0));
    }

    #[test]
    fn test_ceil_keeps_boundaries() {
        let utc = Utc.fix();
        let b = ms(2024, 2, 1, 0);
        assert_eq!(ceil_to(b, SnapUnit::Month, utc), b);
        assert_eq!(ceil_to(b + 1, SnapUnit::Month, utc), ms(2024, 3, 1, 0));
    }

    #[test]
    fn test_boundaries_cover_range() {
        let grid = TimeGrid::utc(SnapUnit::Week);
        let marks = grid.boundaries(ms(2024, 5, 15, 0), ms(2024, 6, 1, 0), 100);
        assert_eq!(marks.first().copied(), Some(ms(2024, 5, 13, 0)));
        assert_eq!(marks.len(), 3);
    }

    #[test]
    fn test_weekend() {
        let utc = Utc.fix();
        assert!(is_weekend(ms(2024, 5, 18, 12), utc));
        assert!(!is_weekend(ms(2024, 5, 17, 12), utc));
    }
}
