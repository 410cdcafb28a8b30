#![doc = r#"
Copperballs library crate.

Three rotozoomed balls drawn entirely by a beam-synchronized display program,
multiplexed into fixed program slots by depth, with a background band spliced
around them and a keyframe timeline driving the animation.

Modules:
- fixed: 12-bit fixed point helpers and the sine table
- rng: seedable pseudo-random source behind the `Random` trait
- screen: display geometry and beam line mapping
- sync: timeline tracks, keyframe evaluation and the track text format
- copper: instruction model, program buffers and the program layout
- background: per-row colours of the background band
- texture: textures and ball bitmap descriptors
- ball: ball state, zoom bounce, scrolling and recycling
- rotozoom: texture writer filling the palette writes of a slot body
- scheduler: slot assignment, jump wiring and per-frame patching
- emulator: reference list processor and playfield renderer
- host: display host trait, input slot and the emulated host
- assets: procedural texture and ball bitmaps
- config: effect parameters
- effect: frame driver (`init`, `render`, `kill`)
- window: interactive window (feature `display`)
- screenshot: PNG export of the framebuffer (feature `screenshot`)

In tests, shared fixtures are available under `crate::test_utils`.
"#]

pub mod assets;
pub mod background;
pub mod ball;
pub mod config;
pub mod copper;
pub mod effect;
pub mod emulator;
pub mod fixed;
pub mod host;
pub mod rng;
pub mod rotozoom;
pub mod scheduler;
pub mod screen;
pub mod sync;
pub mod texture;

#[cfg(feature = "display")]
pub mod window;

#[cfg(feature = "screenshot")]
pub mod screenshot;

// Re-export commonly used types at the crate root for convenience.
pub use config::EffectConfig;
pub use copper::{ProgramBuffer, ProgramLayout};
pub use effect::{Effect, Flow};
pub use emulator::Emulator;
pub use host::{DisplayHost, EmulatedDisplay, Event};
pub use sync::TrackSet;

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
