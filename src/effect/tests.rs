use test_log::test;

use super::*;
use crate::ball::SizeClass;
use crate::emulator::Emulator;
use crate::screen::{BAND_BOTTOM, WINDOW_TOP};
use crate::test_utils::{flat_texture, test_bitmaps};

fn still_config() -> EffectConfig {
    EffectConfig {
        scroll_step: 0,
        ..EffectConfig::default()
    }
}

fn effect_with(config: EffectConfig, tracks: TrackSet) -> (Effect<XorShift>, EmulatedDisplay) {
    let mut host = EmulatedDisplay::default();
    let rng = XorShift::new(config.seed);
    let effect = Effect::init(config, flat_texture(0x0c8), test_bitmaps(), tracks, rng, &mut host).unwrap();
    (effect, host)
}

fn place(effect: &mut Effect<XorShift>, rows: [(SizeClass, i32); BALLS]) {
    for (b, (size, y)) in effect.balls_mut().iter_mut().zip(rows) {
        b.size = size;
        b.screen_y = y;
    }
}

#[test]
fn active_buffer_is_never_written() {
    let (mut effect, mut host) = effect_with(EffectConfig::default(), TrackSet::new());
    assert_eq!(effect.active(), 0);

    for _ in 0..4 {
        let shown = effect.active();
        let snapshot = effect.buffer(shown).clone();
        assert_eq!(effect.render(&mut host).unwrap(), Flow::Continue);
        assert_eq!(effect.buffer(shown), &snapshot, "armed buffer changed during render");
        assert_eq!(effect.active(), shown ^ 1);
    }
    // Two swaps return to the original buffer.
    assert_eq!(effect.active(), 0);
}

#[test]
fn layouts_and_lengths_survive_rendering() {
    let (mut effect, mut host) = effect_with(EffectConfig::default(), TrackSet::new());
    let layouts = [*effect.layout(0), *effect.layout(1)];
    let lens = [effect.buffer(0).len(), effect.buffer(1).len()];
    for _ in 0..300 {
        effect.render(&mut host).unwrap();
    }
    assert_eq!([*effect.layout(0), *effect.layout(1)], layouts);
    assert_eq!([effect.buffer(0).len(), effect.buffer(1).len()], lens);
}

#[test]
fn hidden_slots_never_execute() {
    let (mut effect, mut host) = effect_with(still_config(), TrackSet::new());
    place(&mut effect, [(SizeClass::Small, 40), (SizeClass::Small, 300), (SizeClass::Large, 400)]);
    effect.render(&mut host).unwrap();

    let active = effect.active();
    let layout = *effect.layout(active);
    let mut emu = Emulator::new();
    emu.set_trace(true);
    let stats = emu.run_frame(effect.buffer(active)).unwrap();
    assert!(stats.ended);

    for skipped in &layout.slots[..2] {
        assert!(!emu.executed_any(skipped.wait_before..skipped.exit_jump + 1));
    }
    let live = &layout.slots[2];
    assert!(emu.executed_any(live.body_range()));
    assert_eq!(emu.executed_at(live.wait_before), Some(crate::screen::beam_line(40)));
    // Slot 0's entry jump is the only instruction of the first two slots that runs.
    assert!(emu.executed_any(layout.slots[0].jump_target..layout.slots[0].jump_target + 1));
}

#[test]
fn band_splice_enters_ball_inside_band() {
    let (mut effect, mut host) = effect_with(still_config(), TrackSet::new());
    place(&mut effect, [(SizeClass::Small, 100), (SizeClass::Small, 210), (SizeClass::Small, 400)]);
    effect.render(&mut host).unwrap();

    let active = effect.active();
    let layout = *effect.layout(active);
    let mut emu = Emulator::new();
    emu.set_trace(true);
    emu.run_frame(effect.buffer(active)).unwrap();

    let second = &layout.slots[2];
    assert_eq!(emu.executed_at(layout.band.row_cell(10)), Some(crate::screen::beam_line(210)));
    assert_eq!(emu.executed_at(second.wait_before), Some(crate::screen::beam_line(210)));
    // Band rows covered by the second ball do not run.
    assert!(!emu.executed_any(layout.band.row_wait(11)..layout.band.exit_jump));
    // The second ball runs into the bottom program; it never reaches its own exit.
    assert!(!emu.executed_any(second.exit_jump..second.exit_jump + 1));
    assert_eq!(
        emu.executed_at(layout.bottom),
        Some(crate::screen::beam_line(BAND_BOTTOM))
    );
}

#[test]
fn top_ball_recycles_during_render() {
    let (mut effect, mut host) = effect_with(EffectConfig::default(), TrackSet::new());
    place(&mut effect, [(SizeClass::Small, -61), (SizeClass::Small, 20), (SizeClass::Small, 120)]);
    let old = effect.balls()[0].clone();
    effect.render(&mut host).unwrap();

    let balls = effect.balls();
    assert_eq!(balls.len(), BALLS);
    assert_eq!(balls[0].screen_y, 19);
    assert_eq!(balls[1].screen_y, 119);
    assert!(balls[2].screen_y >= BAND_BOTTOM);
    assert!(balls[0].bottom() >= WINDOW_TOP);
    assert_ne!(
        (balls[2].zoom, balls[2].angle, balls[2].screen_x),
        (old.zoom, old.angle, old.screen_x)
    );
}

#[test]
fn pointer_motion_steers_top_ball() {
    let (mut effect, mut host) = effect_with(still_config(), TrackSet::new());
    place(&mut effect, [(SizeClass::Small, 40), (SizeClass::Small, 200), (SizeClass::Small, 300)]);
    host.events_mut().push(Event::PointerMotion { x: 200, y: 80 });
    effect.render(&mut host).unwrap();
    let top = &effect.balls()[0];
    assert_eq!(top.screen_x, 40);
    assert_eq!(top.screen_y, 80 - 30);
}

#[test]
fn quit_event_stops_without_flipping() {
    let (mut effect, mut host) = effect_with(EffectConfig::default(), TrackSet::new());
    host.events_mut().push(Event::Quit);
    assert_eq!(effect.render(&mut host).unwrap(), Flow::Quit);
    assert_eq!(effect.active(), 0);
    assert_eq!(effect.frame(), 0);
    effect.kill();
}

#[test]
fn scroll_track_drives_rows_per_frame() {
    let tracks = TrackSet::parse("track scroll\n mode step\n 0 0\n 2 3\nend\n").unwrap();
    let (mut effect, mut host) = effect_with(EffectConfig::default(), tracks);
    place(&mut effect, [(SizeClass::Small, 40), (SizeClass::Small, 120), (SizeClass::Small, 200)]);

    effect.render(&mut host).unwrap();
    effect.render(&mut host).unwrap();
    assert_eq!(effect.balls()[0].screen_y, 40);
    effect.render(&mut host).unwrap();
    assert_eq!(effect.balls()[0].screen_y, 37);
}

#[test]
fn negative_scroll_holds_the_balls() {
    let tracks = TrackSet::parse("track scroll\n 0 -5\nend\n").unwrap();
    let (mut effect, mut host) = effect_with(EffectConfig::default(), tracks);
    place(&mut effect, [(SizeClass::Small, 40), (SizeClass::Small, 120), (SizeClass::Small, 200)]);

    for _ in 0..3 {
        effect.render(&mut host).unwrap();
    }
    let rows: Vec<i32> = effect.balls().iter().map(|b| b.screen_y).collect();
    assert_eq!(rows, [40, 120, 200]);
}

#[test]
fn init_rewinds_tracks() {
    let mut tracks = TrackSet::parse("track spin\n mode event\n 0 1\nend\n").unwrap();
    let id = tracks.find(SPIN_TRACK).unwrap();
    assert_eq!(tracks.value(id, 0), 1);
    assert_eq!(tracks.value(id, 3), 0);

    let (mut effect, mut host) = effect_with(still_config(), tracks);
    let steps: Vec<i16> = effect.balls().iter().map(|b| b.angle_step).collect();
    effect.render(&mut host).unwrap();
    let after: Vec<i16> = effect.balls().iter().map(|b| b.angle_step).collect();
    assert_eq!(after, steps.iter().map(|s| s.wrapping_neg()).collect::<Vec<_>>());
}

#[test]
fn spin_event_reverses_rotation_once() {
    let tracks = TrackSet::parse("track spin\n mode event\n 1 1\nend\n").unwrap();
    let (mut effect, mut host) = effect_with(still_config(), tracks);
    let steps: Vec<i16> = effect.balls().iter().map(|b| b.angle_step).collect();

    effect.render(&mut host).unwrap();
    effect.render(&mut host).unwrap();
    let reversed: Vec<i16> = effect.balls().iter().map(|b| b.angle_step).collect();
    assert_eq!(reversed, steps.iter().map(|s| s.wrapping_neg()).collect::<Vec<_>>());

    for _ in 0..5 {
        effect.render(&mut host).unwrap();
    }
    let later: Vec<i16> = effect.balls().iter().map(|b| b.angle_step).collect();
    assert_eq!(later, reversed);
}

#[test]
fn headless_setup_renders_balls() {
    let (mut effect, mut host) = setup(EffectConfig::default(), TrackSet::new()).unwrap();
    for _ in 0..3 {
        effect.render(&mut host).unwrap();
    }
    assert!(host.last_stats().ended);
    let base = crate::emulator::renderer::rgba(EffectConfig::default().base_color);
    let fb = host.emulator().framebuffer();
    let distinct = fb
        .chunks_exact(4)
        .filter(|px| *px != base.as_slice())
        .count();
    assert!(distinct > 1000, "only {distinct} non-background pixels");
}
