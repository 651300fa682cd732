//! A simulated morning on the host: set the alarm, let it ring, snooze, switch it off.
//!
//! Run with: `cargo run --example console_clock`

use std::time::Duration;

use clockit::sim::{RecordingSink, SimBoard};
use clockit::{ClockTime, Meridiem, Mode, Result, SetPhase};

fn main() -> Result<()> {
    let mut board = SimBoard::booted()?;
    report(&board, "power up");

    // Hold SNOOZE to reach alarm-set mode, walk the alarm up, then hold SNOOZE to leave.
    board.snooze.press_for_ms(2_000);
    board.run_until(3_000, |board| board.alarm_clock.mode() != Mode::Normal)?;
    report(&board, "holding snooze");
    board.run_until(3_000, |board| {
        board.alarm_clock.mode() == Mode::SetAlarm(SetPhase::Editing)
    })?;
    board.increase.press_for_ms(1_500);
    board.run_for_ms(2_000)?;
    report(&board, "alarm edited");
    board.snooze.press_for_ms(2_500);
    board.run_until(6_000, |board| board.alarm_clock.mode() == Mode::Normal)?;

    // Jump to just before the alarm and arm it.
    let alarm = ClockTime::new(6, 45, 0, Meridiem::Am)?;
    board.set_alarm_time(alarm);
    board.set_wall_time(ClockTime::new(6, 44, 57, Meridiem::Am)?);
    board.alarm_switch.set_on(true);
    board.run_for_ms(1)?;
    report(&board, "armed");

    board.run_until(5_000, |board| board.state().ringing)?;
    report(&board, "ringing");
    board.run_for_ms(3_000)?;
    println!("  siren edges so far: {}", board.buzzer.0.rising_edges());

    board.snooze.press_for_ms(200);
    board.run_for_ms(2_000)?;
    report(&board, "snoozed");

    if let Some(target) = board.state().snooze_target {
        let mut just_before = target;
        just_before.sub_minutes(1);
        board.set_wall_time(ClockTime::new(
            just_before.hours(),
            just_before.minutes(),
            58,
            just_before.meridiem(),
        )?);
    }
    board.run_until(5_000, |board| board.state().ringing)?;
    report(&board, "ringing again");

    board.alarm_switch.set_on(false);
    board.run_for_ms(500)?;
    report(&board, "switched off");
    Ok(())
}

fn report(board: &SimBoard, label: &str) {
    let state = board.state();
    let face = board
        .with_sink(RecordingSink::last_text)
        .unwrap_or_default();
    println!(
        "[{:>7.3} s] {label:<14} display {face:>5}  wall {}  alarm {}  mode {:?}{}{}",
        Duration::from_micros(board.clock.now_us()).as_secs_f64(),
        state.wall.time,
        state.alarm,
        board.alarm_clock.mode(),
        if state.armed { "  armed" } else { "" },
        if state.ringing { "  RINGING" } else { "" },
    );
}
