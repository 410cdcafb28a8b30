//! PNG export of the emulated framebuffer.

use std::path::Path;

use crate::emulator::Emulator;
use crate::screen::{WIDTH, WINDOW_HEIGHT};

/// Write the last rendered frame to `path`; the format follows the extension.
pub fn save(emulator: &Emulator, path: &Path) -> Result<(), String> {
    let image = image::RgbaImage::from_raw(
        WIDTH as u32,
        WINDOW_HEIGHT as u32,
        emulator.framebuffer().to_vec(),
    )
    .ok_or_else(|| "framebuffer does not match the window size".to_string())?;
    image
        .save(path)
        .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    log::info!("[Screenshot] Wrote {}", path.display());
    Ok(())
}
