use std::path::PathBuf;

use copperballs::effect::{self, Flow};
use copperballs::{EffectConfig, TrackSet};

const USAGE: &str = "usage: copperballs [--frames N] [--seed N] [--tracks FILE] [--window] [--screenshot FILE]";

#[derive(Debug, Default)]
struct Options {
    config: EffectConfig,
    tracks: Option<PathBuf>,
    window: bool,
    screenshot: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or_else(|| format!("{name} needs a value\n{USAGE}"));
        match arg.as_str() {
            "--frames" => {
                let v = value("--frames")?;
                opts.config.frames = v.parse().map_err(|_| format!("invalid frame count '{v}'"))?;
            }
            "--seed" => {
                let v = value("--seed")?;
                let parsed = match v.strip_prefix("0x") {
                    Some(hex) => u64::from_str_radix(hex, 16),
                    None => v.parse(),
                };
                opts.config.seed = parsed.map_err(|_| format!("invalid seed '{v}'"))?;
            }
            "--tracks" => opts.tracks = Some(PathBuf::from(value("--tracks")?)),
            "--screenshot" => opts.screenshot = Some(PathBuf::from(value("--screenshot")?)),
            "--window" => opts.window = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unknown argument '{other}'\n{USAGE}")),
        }
    }
    Ok(opts)
}

fn load_tracks(path: Option<&PathBuf>) -> Result<TrackSet, String> {
    let Some(path) = path else {
        return Ok(TrackSet::new());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    TrackSet::parse(&text).map_err(|e| format!("{}: {e}", path.display()))
}

#[cfg(feature = "display")]
fn run_window(config: EffectConfig, tracks: TrackSet) -> Result<(), String> {
    copperballs::window::run(config, tracks)
}

#[cfg(not(feature = "display"))]
fn run_window(_config: EffectConfig, _tracks: TrackSet) -> Result<(), String> {
    Err("built without the `display` feature".to_string())
}

#[cfg(feature = "screenshot")]
fn save_screenshot(emulator: &copperballs::Emulator, path: &std::path::Path) -> Result<(), String> {
    copperballs::screenshot::save(emulator, path)
}

#[cfg(not(feature = "screenshot"))]
fn save_screenshot(_emulator: &copperballs::Emulator, _path: &std::path::Path) -> Result<(), String> {
    Err("built without the `screenshot` feature".to_string())
}

fn run() -> Result<(), String> {
    let opts = parse_args(std::env::args().skip(1))?;
    let tracks = load_tracks(opts.tracks.as_ref())?;
    if opts.window {
        return run_window(opts.config, tracks);
    }

    let frames = opts.config.frames;
    let (mut effect, mut host) = effect::setup(opts.config, tracks).map_err(|e| e.to_string())?;
    let mut steps = 0usize;
    for _ in 0..frames {
        if effect.render(&mut host).map_err(|e| e.to_string())? == Flow::Quit {
            break;
        }
        steps += host.last_stats().steps;
    }

    // Inspect state
    println!("frames: {}", effect.frame());
    println!("frames shown: {}", host.emulator().frames());
    println!("instructions executed: {steps}");
    println!("active buffer: {}", effect.active());
    for (i, ball) in effect.balls().iter().enumerate() {
        println!(
            "ball {i}: {:?} y={} x={} zoom={}",
            ball.size, ball.screen_y, ball.screen_x, ball.zoom
        );
    }

    if let Some(path) = opts.screenshot.as_ref() {
        save_screenshot(host.emulator(), path)?;
    }
    effect.kill();
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("copperballs: {e}");
        std::process::exit(1);
    }
}
