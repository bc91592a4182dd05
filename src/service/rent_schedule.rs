use chrono::{DateTime, Months, Utc};

/// One month's rent obligation, ready to be inserted alongside its lease.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledPayment {
    pub month_number: i32,
    pub due_date: DateTime<Utc>,
    pub amount: i64,
}

/// Due date for month `n` of a lease, always computed from the lease start
/// rather than the previous due date. `Months` addition clamps to the last
/// day of shorter target months, so a lease starting Jan 31 is due Feb 28
/// (29 in leap years) and back on the 31st in March.
pub fn due_date_for_month(start: DateTime<Utc>, month_number: u32) -> Option<DateTime<Utc>> {
    start.checked_add_months(Months::new(month_number))
}

/// Generate the full rent schedule for a lease: one pending payment per
/// month, due dates stepping one calendar month from the start, month
/// numbers 1.., stopping once a due date reaches the lease end. A lease of
/// D months therefore yields exactly D payments with due dates
/// start+1mo ..= start+Dmo.
pub fn build_schedule(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    monthly_rent: i64,
) -> Vec<ScheduledPayment> {
    let mut schedule = Vec::new();

    if start >= end {
        return schedule;
    }

    let mut month_number: u32 = 1;
    loop {
        let due_date = match due_date_for_month(start, month_number) {
            Some(date) => date,
            None => break,
        };

        schedule.push(ScheduledPayment {
            month_number: month_number as i32,
            due_date,
            amount: monthly_rent,
        });

        if due_date >= end {
            break;
        }
        month_number += 1;
    }

    schedule
}

/// Lease end date for a given start and duration, using the same clamping
/// month arithmetic as the schedule itself.
pub fn lease_end_date(start: DateTime<Utc>, duration_months: i32) -> Option<DateTime<Utc>> {
    if duration_months <= 0 {
        return None;
    }
    due_date_for_month(start, duration_months as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn twelve_month_lease_yields_twelve_payments() {
        let start = date(2024, 6, 1);
        let end = lease_end_date(start, 12).unwrap();
        let schedule = build_schedule(start, end, 25_000);

        assert_eq!(schedule.len(), 12);
        for (i, payment) in schedule.iter().enumerate() {
            assert_eq!(payment.month_number, i as i32 + 1);
            assert_eq!(payment.amount, 25_000);
        }
        assert_eq!(schedule[0].due_date, date(2024, 7, 1));
        assert_eq!(schedule[5].due_date, date(2024, 12, 1));
        assert_eq!(schedule[11].due_date, date(2025, 6, 1));
        assert_eq!(schedule.last().unwrap().due_date, end);
    }

    #[test]
    fn month_end_start_clamps_to_short_months() {
        let start = date(2025, 1, 31);
        let end = lease_end_date(start, 3).unwrap();
        let schedule = build_schedule(start, end, 18_000);

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[0].due_date, date(2025, 2, 28));
        // Clamping does not drift: March is back on the 31st
        assert_eq!(schedule[1].due_date, date(2025, 3, 31));
        assert_eq!(schedule[2].due_date, date(2025, 4, 30));
    }

    #[test]
    fn leap_year_february_keeps_the_29th() {
        let start = date(2024, 1, 31);
        let schedule = build_schedule(start, lease_end_date(start, 1).unwrap(), 10_000);

        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].due_date, date(2024, 2, 29));
    }

    #[test]
    fn degenerate_range_yields_no_payments() {
        let start = date(2024, 6, 1);
        assert!(build_schedule(start, start, 10_000).is_empty());
        assert!(build_schedule(start, date(2024, 5, 1), 10_000).is_empty());
    }

    #[test]
    fn zero_duration_has_no_end_date() {
        assert!(lease_end_date(date(2024, 6, 1), 0).is_none());
        assert!(lease_end_date(date(2024, 6, 1), -3).is_none());
    }
}
