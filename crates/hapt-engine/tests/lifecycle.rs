mod common;

use common::{Call, RecordingRenderer, Rig};
use hapt_engine::{Arbiter, Clock, ManualClock, Priority, SlotState};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn fresh_arbiter_is_idle_at_default_priority() {
    let rig = Rig::new(true);
    let a = rig.arbiter.lock();

    assert!(a.capability_supported());
    assert_eq!(a.priority(), Priority::DEFAULT);
    assert_eq!(a.loaded_duration(), Duration::ZERO);
    assert_eq!(a.playback_window(), (rig.now(), rig.now()));
    assert_eq!(a.state(), SlotState::Idle);
    drop(a);
    assert_eq!(rig.calls(), vec![Call::Detect, Call::Acquire]);
}

#[test]
fn unsupported_platform_skips_native_calls_but_keeps_time() {
    let rig = Rig::new(false);
    let e = rig.emitter("silent", 1500, 10);
    rig.advance_ms(40);

    assert!(e.play().is_granted());

    let a = rig.arbiter.lock();
    assert!(!a.capability_supported());
    let (start, end) = a.playback_window();
    assert_eq!(start, rig.now());
    // Nothing was loaded, so the window is empty.
    assert_eq!(end, start);
    assert!(!a.is_playing());
    assert_eq!(a.priority().value(), 10);
    drop(a);
    assert_eq!(rig.calls(), vec![Call::Detect]);
}

#[test]
fn failed_acquire_degrades_to_unsupported() {
    let (renderer, log) = RecordingRenderer::new(true);
    let clock = ManualClock::new();
    let arbiter = Arbiter::with_clock(Box::new(renderer.failing_acquire()), Arc::new(clock));

    assert!(!arbiter.capability_supported());
    drop(arbiter);
    // Never acquired, so never released.
    assert_eq!(log.lock().calls, vec![Call::Detect, Call::Acquire]);
}

#[test]
fn failed_load_keeps_bookkeeping_running() {
    let rig = Rig::new(true);
    let mut arbiter = rig.arbiter.lock();

    arbiter.load(&[1, 2, 3]);
    arbiter.play();

    assert_eq!(arbiter.loaded_duration(), Duration::ZERO);
    assert_eq!(arbiter.playback_window().0, rig.now());
}

#[test]
fn focus_loss_stops_and_releases_then_regain_reacquires() {
    let rig = Rig::new(true);
    let e = rig.emitter("rumble", 5000, 128);
    e.play();
    rig.clear_calls();

    rig.arbiter.lock().on_focus_changed(false);
    assert!(!rig.arbiter.lock().is_playing());
    assert_eq!(rig.calls(), vec![Call::Stop, Call::Release]);

    // Released: requests are still arbitrated, the renderer is not called.
    rig.clear_calls();
    assert!(e.play().is_granted());
    assert!(rig.calls().is_empty());
    assert!(!rig.arbiter.lock().is_playing());

    rig.arbiter.lock().on_focus_changed(true);
    assert_eq!(rig.calls(), vec![Call::Acquire]);
    assert!(rig.arbiter.lock().capability_supported());

    rig.clear_calls();
    e.play();
    assert_eq!(rig.calls(), vec![Call::Load(5000u32.to_le_bytes().to_vec()), Call::Play]);
}

#[test]
fn plays_while_unfocused_open_no_window() {
    let rig = Rig::new(true);
    rig.emitter("long", 5000, 128).play();
    rig.arbiter.lock().on_focus_changed(false);

    let urgent = rig.emitter("urgent", 100, 0);
    assert!(urgent.play().is_granted());
    {
        let a = rig.arbiter.lock();
        assert_eq!(a.loaded_duration(), Duration::ZERO);
        assert!(!a.is_playing());
    }

    rig.advance_ms(1000);
    assert!(!rig.arbiter.lock().is_playing());
    assert!(rig.emitter("ambient", 300, 128).play().is_granted());
    assert!(!rig.arbiter.lock().is_playing());
}

#[test]
fn focus_regain_without_loss_does_not_reacquire() {
    let rig = Rig::new(true);
    rig.clear_calls();
    rig.arbiter.lock().on_focus_changed(true);
    assert!(rig.calls().is_empty());
}

#[test]
fn focus_changes_on_unsupported_platform_only_touch_bookkeeping() {
    let rig = Rig::new(false);
    rig.arbiter.lock().on_focus_changed(false);
    rig.arbiter.lock().on_focus_changed(true);
    assert_eq!(rig.calls(), vec![Call::Detect]);
    assert!(!rig.arbiter.lock().capability_supported());
}

#[test]
fn shutdown_is_idempotent_and_drop_does_not_release_twice() {
    let rig = Rig::new(true);
    rig.arbiter.lock().shutdown();
    rig.arbiter.lock().shutdown();

    let log = rig.log.clone();
    drop(rig);
    assert_eq!(log.lock().calls, vec![Call::Detect, Call::Acquire, Call::Release]);
}

#[test]
fn drop_releases_acquired_renderer() {
    let (renderer, log) = RecordingRenderer::new(true);
    let arbiter = Arbiter::with_clock(Box::new(renderer), Arc::new(ManualClock::new()));
    drop(arbiter);
    assert_eq!(log.lock().calls.last(), Some(&Call::Release));
}

#[test]
fn remaining_counts_down() {
    let rig = Rig::new(true);
    rig.emitter("ramp", 1000, 128).play();
    rig.advance_ms(250);
    assert_eq!(rig.arbiter.lock().remaining(), Duration::from_millis(750));
}

#[test]
fn system_clock_arbiter_reports_playing() {
    let (renderer, _log) = RecordingRenderer::new(true);
    let mut arbiter = Arbiter::new(Box::new(renderer));
    arbiter.load(&60_000u32.to_le_bytes());
    arbiter.play();
    assert!(arbiter.is_playing());
    arbiter.stop();
    assert!(!arbiter.is_playing());
}

#[test]
fn manual_clock_is_shared_with_arbiter() {
    let clock = ManualClock::new();
    let (renderer, _log) = RecordingRenderer::new(true);
    let mut arbiter = Arbiter::with_clock(Box::new(renderer), Arc::new(clock.clone()));
    arbiter.load(&100u32.to_le_bytes());
    arbiter.play();
    clock.advance(Duration::from_millis(100));
    assert!(!arbiter.is_playing());
    assert_eq!(arbiter.playback_window().1, clock.now());
}
