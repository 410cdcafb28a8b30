#![doc = r#"
Frame driver

Lifecycle
- `Effect::init` builds both program buffers, the background band and the
  initial balls, binds the optional timeline tracks, paints buffer 0 and arms it.
- `Effect::render` runs one frame:
  1. poll one input event (pointer motion steers the top ball, quit stops),
  2. advance the balls (scroll, recycle, texture animation),
  3. schedule and paint the inactive buffer,
  4. wait for vertical blank, flip, arm the freshly painted buffer.
- `Effect::kill` releases both buffers.

The buffer armed on the display is never written; all writes of a frame are
done before that frame is armed.

Timeline tracks
- `scroll`: rows per frame (default `EffectConfig::scroll_step`). Balls only
  scroll upward; negative values stop the scroll.
- `zoom-kick`: added to every ball's zoom before clamping.
- `spin`: a non-zero value reverses every ball's rotation.
Missing tracks are logged and the defaults apply.
"#]

use std::fmt;
use std::rc::Rc;

use crate::assets;
use crate::background::BackgroundTable;
use crate::ball::{self, Ball};
use crate::config::EffectConfig;
use crate::copper::{self, ProgramBuffer, ProgramError, ProgramLayout};
use crate::emulator::EmulatorFault;
use crate::host::{DisplayHost, EmulatedDisplay, Event};
use crate::rng::{Random, XorShift};
use crate::rotozoom::{self, NearestSampler, Sampler, Uv};
use crate::scheduler::Schedule;
use crate::screen::{BALLS, WIDTH};
use crate::sync::{TrackId, TrackSet};
use crate::texture::{BallBitmaps, Texture, TextureError};

pub const SCROLL_TRACK: &str = "scroll";
pub const ZOOM_KICK_TRACK: &str = "zoom-kick";
pub const SPIN_TRACK: &str = "spin";

#[derive(Debug)]
pub enum EffectError {
    Program(ProgramError),
    Texture(TextureError),
    Emulator(EmulatorFault),
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectError::Program(e) => write!(f, "program construction failed: {e}"),
            EffectError::Texture(e) => write!(f, "texture setup failed: {e}"),
            EffectError::Emulator(e) => write!(f, "display fault: {e}"),
        }
    }
}

impl std::error::Error for EffectError {}

impl From<ProgramError> for EffectError {
    fn from(e: ProgramError) -> Self {
        EffectError::Program(e)
    }
}

impl From<TextureError> for EffectError {
    fn from(e: TextureError) -> Self {
        EffectError::Texture(e)
    }
}

impl From<EmulatorFault> for EffectError {
    fn from(e: EmulatorFault) -> Self {
        EffectError::Emulator(e)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Copy, Clone, Debug, Default)]
struct Bindings {
    scroll: Option<TrackId>,
    zoom_kick: Option<TrackId>,
    spin: Option<TrackId>,
}

fn bind(tracks: &TrackSet, name: &str) -> Option<TrackId> {
    match tracks.find(name) {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("[Effect] {}; using the default", e);
            None
        }
    }
}

pub struct Effect<R: Random, S: Sampler = NearestSampler> {
    config: EffectConfig,
    buffers: [ProgramBuffer; 2],
    layouts: [ProgramLayout; 2],
    active: usize,
    background: BackgroundTable,
    bitmaps: BallBitmaps,
    balls: [Ball; BALLS],
    tracks: TrackSet,
    bindings: Bindings,
    rng: R,
    sampler: S,
    frame: i32,
    schedule: Option<Schedule>,
}

impl<R: Random> Effect<R> {
    pub fn init<H: DisplayHost>(
        config: EffectConfig,
        texture: Rc<Texture>,
        bitmaps: BallBitmaps,
        tracks: TrackSet,
        rng: R,
        host: &mut H,
    ) -> Result<Self, ProgramError> {
        Self::with_sampler(config, texture, bitmaps, tracks, rng, NearestSampler, host)
    }
}

impl<R: Random, S: Sampler> Effect<R, S> {
    pub fn with_sampler<H: DisplayHost>(
        config: EffectConfig,
        texture: Rc<Texture>,
        bitmaps: BallBitmaps,
        mut tracks: TrackSet,
        mut rng: R,
        sampler: S,
        host: &mut H,
    ) -> Result<Self, ProgramError> {
        let background = BackgroundTable::band(config.band_from, config.band_to);
        let (front, front_layout) = copper::build(0, &background, config.base_color)?;
        let (back, back_layout) = copper::build(1, &background, config.base_color)?;

        tracks.reset_all();
        let bindings = Bindings {
            scroll: bind(&tracks, SCROLL_TRACK),
            zoom_kick: bind(&tracks, ZOOM_KICK_TRACK),
            spin: bind(&tracks, SPIN_TRACK),
        };
        let balls = ball::spawn(&mut rng, &texture, config.first_row, config.spacing);

        let mut effect = Self {
            config,
            buffers: [front, back],
            layouts: [front_layout, back_layout],
            active: 0,
            background,
            bitmaps,
            balls,
            tracks,
            bindings,
            rng,
            sampler,
            frame: 0,
            schedule: None,
        };
        effect.draw(0, 0);
        host.arm(&effect.buffers[0]);
        log::info!(
            "[Effect] Initialized: seed {:#x}, {} tracks",
            effect.config.seed,
            effect.tracks.len()
        );
        Ok(effect)
    }

    /// Index of the buffer currently armed on the display.
    pub fn active(&self) -> usize {
        self.active
    }

    pub fn buffer(&self, index: usize) -> &ProgramBuffer {
        &self.buffers[index]
    }

    pub fn layout(&self, index: usize) -> &ProgramLayout {
        &self.layouts[index]
    }

    pub fn balls(&self) -> &[Ball; BALLS] {
        &self.balls
    }

    pub fn balls_mut(&mut self) -> &mut [Ball; BALLS] {
        &mut self.balls
    }

    pub fn frame(&self) -> i32 {
        self.frame
    }

    /// Schedule used for the most recently painted buffer.
    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    fn track_value(&mut self, id: Option<TrackId>) -> Option<i32> {
        id.map(|id| self.tracks.value(id, self.frame))
    }

    fn handle_event(&mut self, event: Event) -> Flow {
        match event {
            Event::PointerMotion { x, y } => {
                let offset_x = x - (WIDTH / 2) as i32;
                let row = y - self.balls[0].height() / 2;
                ball::steer(&mut self.balls, offset_x, row);
                Flow::Continue
            }
            Event::Quit => Flow::Quit,
        }
    }

    /// Move every ball for this frame. Returns the zoom boost to paint with.
    fn advance(&mut self) -> i16 {
        let rows = self
            .track_value(self.bindings.scroll)
            .unwrap_or(self.config.scroll_step)
            .max(0);
        let boost = self.track_value(self.bindings.zoom_kick).unwrap_or(0);
        let spin = self.track_value(self.bindings.spin).unwrap_or(0);

        let recycled = ball::scroll(&mut self.balls, rows, &mut self.rng, self.config.spacing);
        if recycled > 0 {
            log::debug!("[Effect] Frame {}: recycled {} ball(s)", self.frame, recycled);
        }
        if spin != 0 {
            for b in self.balls.iter_mut() {
                b.angle_step = b.angle_step.wrapping_neg();
            }
        }
        boost.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }

    /// Schedule and paint buffer `index` from the current ball state.
    fn draw(&mut self, index: usize, boost: i16) {
        let schedule = Schedule::plan(&self.balls, &self.background);
        let program = &mut self.buffers[index];
        let layout = &self.layouts[index];
        schedule.apply(program, layout, &self.balls, &self.bitmaps, &self.background);

        for (slot, region) in layout.slots.iter().enumerate() {
            let Some(b) = schedule.slots[slot] else { continue };
            let ball = &self.balls[b];
            rotozoom::paint(
                &self.sampler,
                program,
                region,
                &ball.texture,
                Uv::new(ball.u, ball.v),
                ball.angle,
                ball.effective_zoom(boost),
            );
        }
        self.schedule = Some(schedule);
    }

    /// One frame. Returns `Flow::Quit` when the host asked to stop.
    pub fn render<H: DisplayHost>(&mut self, host: &mut H) -> Result<Flow, H::Error> {
        if let Some(event) = host.poll_event() {
            if self.handle_event(event) == Flow::Quit {
                log::info!("[Effect] Quit requested at frame {}", self.frame);
                return Ok(Flow::Quit);
            }
        }

        let boost = self.advance();
        let inactive = self.active ^ 1;
        self.draw(inactive, boost);
        for b in self.balls.iter_mut() {
            b.step_texture();
        }

        host.wait_vblank()?;
        self.active = inactive;
        host.arm(&self.buffers[self.active]);
        self.frame += 1;
        Ok(Flow::Continue)
    }

    /// Release both buffers.
    pub fn kill(self) {
        log::info!(
            "[Effect] Killed after {} frames; released buffers {} and {}",
            self.frame,
            self.buffers[0].id(),
            self.buffers[1].id()
        );
    }
}

/// Build the whole effect on an emulated display: assets, chip memory, buffers.
pub fn setup(
    config: EffectConfig,
    tracks: TrackSet,
) -> Result<(Effect<XorShift>, EmulatedDisplay), EffectError> {
    let mut host = EmulatedDisplay::default();
    let texture = Rc::new(assets::texture()?);
    let bitmaps = assets::upload_balls(host.emulator_mut().memory_mut())?;
    let rng = XorShift::new(config.seed);
    let effect = Effect::init(config, texture, bitmaps, tracks, rng, &mut host)?;
    Ok((effect, host))
}

#[cfg(test)]
mod tests;
