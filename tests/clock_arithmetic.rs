//! Properties of the 12-hour clock arithmetic, checked against a minute-of-day model.
#![expect(
    clippy::arithmetic_side_effects,
    clippy::integer_division_remainder_used,
    reason = "The model computes expected minutes directly"
)]

use clockit::{ClockTime, Meridiem, WallTime};

const MINUTES_PER_DAY: u16 = 24 * 60;

fn meridiem(pm: bool) -> Meridiem {
    if pm { Meridiem::Pm } else { Meridiem::Am }
}

/// Minutes since midnight, treating 12 AM as hour 0 and 12 PM as noon.
fn minute_of_day(time: ClockTime) -> u16 {
    let half_day = if time.meridiem() == Meridiem::Pm { 12 * 60 } else { 0 };
    u16::from(time.hours() % 12) * 60 + u16::from(time.minutes()) + half_day
}

proptest::proptest! {
    /// Sixty ticks advance exactly one minute and leave seconds where they were.
    #[test]
    fn sixty_ticks_make_a_minute(
        hours in 1u8..=12,
        minutes in 0u8..=59,
        seconds in 0u8..=59,
        pm in proptest::bool::ANY,
    ) {
        let start = ClockTime::new(hours, minutes, seconds, meridiem(pm)).expect("in range");
        let mut wall = WallTime::new(start);
        for _ in 0..60 {
            wall.tick();
        }
        assert_eq!(wall.time.seconds(), seconds);
        assert_eq!(
            minute_of_day(wall.time),
            (minute_of_day(start) + 1) % MINUTES_PER_DAY
        );
        assert!(!wall.blink, "an even number of toggles");
    }

    /// Snoozing lands nine minutes later on the top of the minute.
    #[test]
    fn snooze_is_nine_minutes_on_the_minute(
        hours in 1u8..=12,
        minutes in 0u8..=59,
        seconds in 0u8..=59,
        pm in proptest::bool::ANY,
    ) {
        let now = ClockTime::new(hours, minutes, seconds, meridiem(pm)).expect("in range");
        let target = now.snooze_target();
        assert_eq!(target.seconds(), 0);
        assert_eq!(minute_of_day(target), (minute_of_day(now) + 9) % MINUTES_PER_DAY);
    }

    /// Adding carries exactly and never touches seconds.
    #[test]
    fn add_minutes_is_exact(
        hours in 1u8..=12,
        minutes in 0u8..=59,
        seconds in 0u8..=59,
        pm in proptest::bool::ANY,
        change in 1u8..=30,
    ) {
        let start = ClockTime::new(hours, minutes, seconds, meridiem(pm)).expect("in range");
        let mut time = start;
        time.add_minutes(change);
        assert_eq!(time.seconds(), seconds);
        assert_eq!(
            minute_of_day(time),
            (minute_of_day(start) + u16::from(change)) % MINUTES_PER_DAY
        );
    }

    /// Subtracting is exact until it would cross the hour, then snaps to :59 of the
    /// previous hour.
    #[test]
    fn sub_minutes_snaps_across_the_hour(
        hours in 1u8..=12,
        minutes in 0u8..=59,
        pm in proptest::bool::ANY,
        change in 1u8..=30,
    ) {
        let start = ClockTime::new(hours, minutes, 0, meridiem(pm)).expect("in range");
        let mut time = start;
        time.sub_minutes(change);
        let expected_back = if change > minutes { u16::from(minutes) + 1 } else { u16::from(change) };
        assert_eq!(
            minute_of_day(time),
            (minute_of_day(start) + MINUTES_PER_DAY - expected_back) % MINUTES_PER_DAY
        );
    }
}

#[test]
fn meridiem_flips_going_into_twelve_only() {
    let mut time = ClockTime::new(11, 59, 59, Meridiem::Am).expect("in range");
    time.advance_second();
    assert_eq!(time, ClockTime::new(12, 0, 0, Meridiem::Pm).expect("in range"));

    let mut time = ClockTime::new(12, 59, 59, Meridiem::Pm).expect("in range");
    time.advance_second();
    assert_eq!(time, ClockTime::new(1, 0, 0, Meridiem::Pm).expect("in range"));
}

#[test]
fn a_full_day_of_ticks_comes_back_around() {
    let start = ClockTime::new(3, 17, 42, Meridiem::Pm).expect("in range");
    let mut wall = WallTime::new(start);
    for _ in 0..24 * 60 * 60 {
        wall.tick();
    }
    assert_eq!(wall.time, start);
}
