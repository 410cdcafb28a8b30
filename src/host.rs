/*!
Display host abstraction: what the frame driver needs from the machine.

Behavior:
- `arm(program)` hands a finished program to the display. It takes effect at
  the next vertical blank; until then the previously armed program keeps
  being shown.
- `wait_vblank()` blocks for one displayed frame. It is the only suspension
  point of the driver.
- Input arrives through a single-slot queue. A newer pointer motion replaces
  an unread one; a quit request is never overwritten.

`EmulatedDisplay` implements the host on top of `crate::emulator`: armed
programs are snapshotted, so the driver may keep patching its own buffers.
*/

use crate::copper::ProgramBuffer;
use crate::emulator::{Emulator, EmulatorFault, FrameStats};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Absolute pointer position in window pixels.
    PointerMotion { x: i32, y: i32 },
    Quit,
}

#[derive(Clone, Debug, Default)]
pub struct EventSlot {
    pending: Option<Event>,
}

impl EventSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        if self.pending != Some(Event::Quit) {
            self.pending = Some(event);
        }
    }

    pub fn take(&mut self) -> Option<Event> {
        self.pending.take()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}

pub trait DisplayHost {
    type Error: std::error::Error;

    fn poll_event(&mut self) -> Option<Event>;

    fn wait_vblank(&mut self) -> Result<(), Self::Error>;

    fn arm(&mut self, program: &ProgramBuffer);
}

/// Host backed by the reference emulator.
pub struct EmulatedDisplay {
    emulator: Emulator,
    shown: Option<ProgramBuffer>,
    armed: Option<ProgramBuffer>,
    events: EventSlot,
    last: FrameStats,
}

impl Default for EmulatedDisplay {
    fn default() -> Self {
        Self::new(Emulator::new())
    }
}

impl EmulatedDisplay {
    pub fn new(emulator: Emulator) -> Self {
        Self {
            emulator,
            shown: None,
            armed: None,
            events: EventSlot::new(),
            last: FrameStats::default(),
        }
    }

    pub fn emulator(&self) -> &Emulator {
        &self.emulator
    }

    pub fn emulator_mut(&mut self) -> &mut Emulator {
        &mut self.emulator
    }

    pub fn events_mut(&mut self) -> &mut EventSlot {
        &mut self.events
    }

    /// Program shown by the last frame.
    pub fn shown(&self) -> Option<&ProgramBuffer> {
        self.shown.as_ref()
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last
    }
}

impl DisplayHost for EmulatedDisplay {
    type Error = EmulatorFault;

    fn poll_event(&mut self) -> Option<Event> {
        self.events.take()
    }

    fn wait_vblank(&mut self) -> Result<(), EmulatorFault> {
        if let Some(next) = self.armed.take() {
            log::trace!("[Host] Vblank: switching to program {}", next.id());
            self.shown = Some(next);
        }
        if let Some(program) = self.shown.as_ref() {
            self.last = self.emulator.run_frame(program)?;
        }
        Ok(())
    }

    fn arm(&mut self, program: &ProgramBuffer) {
        self.armed = Some(program.clone());
    }
}
