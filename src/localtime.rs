use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Slot width for staffing projections.
pub const SLOT_MINUTES: i64 = 15;

pub const SLOTS_PER_DAY: usize = (24 * 60 / SLOT_MINUTES) as usize;

/// Walking time from the stand to the passenger control point.
pub const PCP_TRANSIT_MINUTES: i64 = 13;

/// Renders a stored UTC instant as the port's local wall-clock time.
/// The conversion honours the zone's DST rules for the specific date.
pub fn local_hhmm(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub fn local_hour(instant: DateTime<Utc>, tz: Tz) -> u32 {
    use chrono::Timelike;
    instant.with_timezone(&tz).hour()
}

/// The UTC instant at which a local civil date begins. On a spring-forward
/// date where midnight itself is skipped, the earliest valid instant wins.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Start instants of every 15-minute slot in a local civil day.
pub fn day_slots(date: NaiveDate, tz: Tz) -> Vec<DateTime<Utc>> {
    let midnight = local_midnight(date, tz);
    (0..SLOTS_PER_DAY as i64)
        .map(|slot| midnight + Duration::minutes(slot * SLOT_MINUTES))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::London;

    fn utc(date: &str, time: &str) -> DateTime<Utc> {
        format!("{date}T{time}Z")
            .parse()
            .expect("valid test instant")
    }

    #[test]
    fn summer_instants_render_one_hour_ahead_in_london() {
        assert_eq!(local_hhmm(utc("2025-07-09", "00:55:00"), London), "01:55");
        assert_eq!(local_hhmm(utc("2025-07-09", "23:30:00"), London), "00:30");
    }

    #[test]
    fn winter_instants_render_at_utc_in_london() {
        assert_eq!(local_hhmm(utc("2025-01-15", "00:55:00"), London), "00:55");
    }

    #[test]
    fn conversion_tracks_the_spring_forward_transition() {
        // London moved to BST at 2026-03-29T01:00Z.
        assert_eq!(local_hhmm(utc("2026-03-29", "00:59:00"), London), "00:59");
        assert_eq!(local_hhmm(utc("2026-03-29", "01:30:00"), London), "02:30");
    }

    #[test]
    fn local_date_rolls_over_with_the_zone_offset() {
        let late = utc("2025-07-09", "23:30:00");
        assert_eq!(
            local_date(late, London),
            NaiveDate::from_ymd_opt(2025, 7, 10).expect("valid date")
        );
    }

    #[test]
    fn day_slots_cover_the_local_day_in_quarter_hours() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 9).expect("valid date");
        let slots = day_slots(date, London);
        assert_eq!(slots.len(), 96);
        // BST midnight is 23:00Z the previous evening.
        assert_eq!(slots[0], utc("2025-07-08", "23:00:00"));
        assert_eq!(slots[4], utc("2025-07-09", "00:00:00"));
    }
}
