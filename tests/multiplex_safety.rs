//! The panel has no current-limiting resistors: never two anode groups live at once, and
//! never one live for longer than a brightness pulse.
#![expect(
    clippy::arithmetic_side_effects,
    reason = "Expected pulse counts are small"
)]

use clockit::bit_matrix_led4::Frame;
use clockit::multiplexer::Multiplexer;
use clockit::shared_constants::BRIGHT_LEVEL_US;
use clockit::sim::{RecordingSink, SimBoard, VirtualClock};
use clockit::{ClockTime, Meridiem};

fn meridiem(pm: bool) -> Meridiem {
    if pm { Meridiem::Pm } else { Meridiem::Am }
}

proptest::proptest! {
    /// Any frame, any number of passes: one group at a time, each for one pulse width.
    #[test]
    fn one_group_at_a_time(
        hours in 1u8..=12,
        minutes in 0u8..=59,
        pm in proptest::bool::ANY,
        colon in proptest::bool::ANY,
        alarm_dot in proptest::bool::ANY,
        passes in 1usize..20,
    ) {
        let clock = VirtualClock::new();
        let mut delay = clock.clone();
        let mut multiplexer = Multiplexer::new(RecordingSink::new(&clock));
        let time = ClockTime::new(hours, minutes, 0, meridiem(pm)).expect("in range");
        let frame = Frame::time(&time, colon, alarm_dot).expect("fits");

        for _ in 0..passes {
            multiplexer.show(&frame, &mut delay).expect("recording sink never fails");
        }

        let sink = multiplexer.sink();
        assert_eq!(sink.overlap_count(), 0);
        assert_eq!(sink.max_on_us(), u64::from(BRIGHT_LEVEL_US));
        assert_eq!(sink.pulse_count(), passes * frame.pulses().len());
        assert!(!sink.is_live());
    }

    /// The tens-of-hours digit is dark exactly when hours are below 10.
    #[test]
    fn leading_zero_is_suppressed(hours in 1u8..=12, minutes in 0u8..=59, pm in proptest::bool::ANY) {
        let time = ClockTime::new(hours, minutes, 0, meridiem(pm)).expect("in range");
        let frame = Frame::time(&time, false, false).expect("fits");
        let digits = frame.pulses().len() - usize::from(!pm);
        assert_eq!(digits, if hours > 9 { 4 } else { 3 });
    }
}

/// A whole ringing minute on the simulated board, with ticks landing inside refreshes and
/// chirps, never breaks the rule.
#[test]
fn ringing_board_never_overlaps() {
    let mut board = SimBoard::booted().expect("sim never fails");
    let alarm = ClockTime::new(6, 30, 0, Meridiem::Am).expect("in range");
    board.alarm_switch.set_on(true);
    board.set_alarm_time(alarm);
    board.set_wall_time(alarm);
    board.run_for_ms(5_000).expect("sim never fails");
    assert!(board.state().ringing);

    board.increase.press_for_ms(20);
    board.snooze.press_for_ms(300);
    board.run_for_ms(3_000).expect("sim never fails");

    let (overlaps, max_on, pulses) = board
        .with_sink(|sink| (sink.overlap_count(), sink.max_on_us(), sink.pulse_count()))
        .expect("panel is idle between polls");
    assert_eq!(overlaps, 0);
    assert_eq!(max_on, u64::from(BRIGHT_LEVEL_US));
    assert!(pulses > 1_000);
}
