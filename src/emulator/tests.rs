use super::renderer::rgba;
use super::*;
use crate::copper::{DMAF_RASTER, DMAF_SETCLR, ProgramBuilder, Register, bplcon0};
use crate::screen::{FETCH_BYTES, beam_line};

fn program(build: impl FnOnce(&mut ProgramBuilder)) -> ProgramBuffer {
    let mut b = ProgramBuilder::new(0, 64);
    build(&mut b);
    b.finish()
}

#[test]
fn waits_split_the_frame_by_line() {
    let p = program(|b| {
        b.write(Register::color(0), 0x00f).unwrap();
        b.wait(beam_line(10), 0).unwrap();
        b.write(Register::color(0), 0xf00).unwrap();
        b.end().unwrap();
    });
    let mut emu = Emulator::new();
    let stats = emu.run_frame(&p).unwrap();
    assert!(stats.ended);
    assert_eq!(stats.steps, 3);
    assert_eq!(emu.pixel(0, 9), rgba(0x00f));
    assert_eq!(emu.pixel(WIDTH - 1, 10), rgba(0xf00));
    assert_eq!(emu.pixel(5, WINDOW_HEIGHT as usize - 1), rgba(0xf00));
    assert_eq!(emu.frames(), 1);
}

#[test]
fn horizontal_position_is_compared_on_the_same_line() {
    let late = Instruction::wait(50, 0xe3);
    let early = Instruction::wait(50, 0x07);
    assert!(!wait_satisfied(&late, 50));
    assert!(wait_satisfied(&late, 51));
    assert!(wait_satisfied(&early, 50));
    assert!(!wait_satisfied(&early, 49));
}

#[test]
fn masked_waits_ignore_masked_bits() {
    let any_line = Instruction::Wait {
        vp: 0xff,
        hp: 0,
        vmask: 0,
        hmask: 0,
    };
    assert!(wait_satisfied(&any_line, 0));
    assert!(!wait_satisfied(&Instruction::end(), BEAM_LINES - 1));
}

#[test]
fn jump_cycle_is_a_runaway_fault() {
    let p = program(|b| {
        b.nop().unwrap();
        b.jump(0).unwrap();
    });
    let mut emu = Emulator::new();
    match emu.run_frame(&p) {
        Err(EmulatorFault::Runaway { steps, .. }) => assert_eq!(steps, STEP_BUDGET + 1),
        other => panic!("expected runaway, got {other:?}"),
    }
}

#[test]
fn jump_outside_program_faults() {
    let p = program(|b| {
        b.jump(40).unwrap();
    });
    let mut emu = Emulator::new();
    assert_eq!(
        emu.run_frame(&p),
        Err(EmulatorFault::PcOutOfRange { pc: 40, len: 1 })
    );
}

#[test]
fn trace_records_index_and_line() {
    let p = program(|b| {
        b.nop().unwrap();
        b.wait(beam_line(3), 0).unwrap();
        b.jump(3).unwrap();
        b.end().unwrap();
    });
    let mut emu = Emulator::new();
    emu.set_trace(true);
    emu.run_frame(&p).unwrap();
    let lines: Vec<(usize, u16)> = emu.trace().iter().map(|t| (t.index, t.line)).collect();
    assert_eq!(lines, vec![(0, 0), (1, beam_line(3)), (2, beam_line(3))]);
    assert_eq!(emu.executed_at(2), Some(beam_line(3)));
    assert!(!emu.executed_any(3..4));

    emu.set_trace(false);
    emu.run_frame(&p).unwrap();
    assert!(emu.trace().is_empty());
}

#[test]
fn planes_are_fetched_shifted_and_advanced() {
    let mut emu = Emulator::new();
    // Two rows of one plane: first pixel set on row 0, second pixel on row 1.
    let mut data = vec![0u8; 2 * FETCH_BYTES];
    data[0] = 0x80;
    data[FETCH_BYTES] = 0x40;
    let plane = emu.memory_mut().upload(&data).unwrap();

    let p = program(|b| {
        b.write(Register::DMACON, DMAF_SETCLR | DMAF_RASTER).unwrap();
        b.write(Register::BPL1MOD, 0).unwrap();
        b.write(Register::color(0), 0x000).unwrap();
        b.write(Register::color(1), 0xfff).unwrap();
        b.write32(Register::bplpth(0), Register::bplptl(0), plane).unwrap();
        b.write(Register::BPLCON1, 0x03).unwrap();
        b.wait(beam_line(20), 0).unwrap();
        b.write(Register::BPLCON0, bplcon0(1)).unwrap();
        b.wait(beam_line(22), 0).unwrap();
        b.write(Register::BPLCON0, bplcon0(0)).unwrap();
        b.end().unwrap();
    });
    emu.run_frame(&p).unwrap();

    assert_eq!(emu.pixel(3, 19), rgba(0x000));
    assert_eq!(emu.pixel(3, 20), rgba(0xfff));
    assert_eq!(emu.pixel(0, 20), rgba(0x000));
    assert_eq!(emu.pixel(4, 21), rgba(0xfff));
    assert_eq!(emu.pixel(3, 21), rgba(0x000));
    assert_eq!(emu.pixel(4, 22), rgba(0x000));
    assert_eq!(emu.registers().bplpt[0], plane + 2 * FETCH_BYTES as u32);
}
