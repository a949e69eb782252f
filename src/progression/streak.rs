use chrono::{DateTime, Utc};

/// Result of advancing a user's streak for a new donation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub streak: i32,
    pub last_donation_date: DateTime<Utc>,
}

/// Advances the consecutive-day donation counter.
///
/// The day difference is the whole number of 24-hour periods between the
/// previous donation and `now`:
/// - exactly one day later extends the streak
/// - a gap of more than one day resets it to 1
/// - a same-day donation leaves it unchanged
/// - a backdated timestamp (negative difference) is treated the same as
///   same-day: the streak is left alone rather than guessing
///
/// `last_donation_date` always becomes `now`, whichever branch ran.
pub fn advance_streak(
    current_streak: i32,
    last_donation_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> StreakUpdate {
    let streak = match last_donation_date {
        None => 1,
        Some(last) => {
            let days_diff = (now - last).num_days();
            if days_diff == 1 {
                current_streak + 1
            } else if days_diff > 1 {
                1
            } else {
                // same day or clock skew
                current_streak
            }
        }
    };

    StreakUpdate {
        streak,
        last_donation_date: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_time() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn first_donation_starts_streak_at_one() {
        let update = advance_streak(0, None, base_time());
        assert_eq!(update.streak, 1);
        assert_eq!(update.last_donation_date, base_time());
    }

    #[test]
    fn consecutive_days_extend_streak() {
        let day0 = base_time();
        let first = advance_streak(0, None, day0);
        let second = advance_streak(first.streak, Some(first.last_donation_date), day0 + Duration::days(1));
        let third = advance_streak(second.streak, Some(second.last_donation_date), day0 + Duration::days(2));

        assert_eq!(third.streak, 3);
    }

    #[test]
    fn gap_resets_streak_to_one() {
        let day0 = base_time();
        let first = advance_streak(0, None, day0);
        let after_gap = advance_streak(first.streak, Some(first.last_donation_date), day0 + Duration::days(2));

        assert_eq!(after_gap.streak, 1);
    }

    #[test]
    fn same_day_donation_keeps_streak() {
        let day0 = base_time();
        let first = advance_streak(0, None, day0);
        let same_day = advance_streak(first.streak, Some(first.last_donation_date), day0 + Duration::hours(3));

        assert_eq!(same_day.streak, 1);
        assert_eq!(same_day.last_donation_date, day0 + Duration::hours(3));
    }

    #[test]
    fn backdated_donation_is_a_no_op_on_the_counter() {
        let now = base_time();
        let update = advance_streak(4, Some(now + Duration::days(2)), now);

        assert_eq!(update.streak, 4);
        assert_eq!(update.last_donation_date, now);
    }

    #[test]
    fn partial_day_counts_as_same_day() {
        let day0 = base_time();
        let update = advance_streak(2, Some(day0), day0 + Duration::hours(23));

        assert_eq!(update.streak, 2);
    }
}
