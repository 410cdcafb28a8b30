/*!
Timeline tracks: authored keyframes evaluated at a frame number.

Model
- A track is an ordered list of `(frame, value)` keys terminated by an `END_KEY`
  sentinel. Keys whose frame is `CTRL_KEY` are control keys: their value is a
  mode tag. A leading control key selects the initial mode; one met later
  switches the mode when the cursor reaches it.
- Evaluation keeps a cursor `(curr, next)` bracketing the queried frame and only
  ever moves it forward. Queries must come with non-decreasing frames; call
  `Track::reset` to start over.

Modes
- `Step`: value of the current key.
- `Linear`: straight interpolation to the next key.
- `Smooth`: sine ease in/out (within ~1% of smoothstep).
- `Ramp`: quadratic ease-in.
- `Trigger`: counts down from the key value by one per frame, never below 0.
- `Event`: yields the key value once per segment, 0 afterwards.

Before the first key continuous modes yield the first value while `Trigger`/`Event`
yield 0. Past the last key continuous modes hold the final value.
*/

pub mod parse;

use std::fmt;

use crate::fixed::{FX12_ONE, FX12_SHIFT, SIN_HALF_PI, div_or_zero, sin};

/// Frame value terminating a key list.
pub const END_KEY: i32 = -1;
/// Frame value marking a control (mode) key.
pub const CTRL_KEY: i32 = -2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrackKey {
    pub frame: i32,
    pub value: i32,
}

impl TrackKey {
    pub const fn new(frame: i32, value: i32) -> Self {
        Self { frame, value }
    }

    /// Control key switching the interpolation mode.
    pub const fn mode(mode: TrackMode) -> Self {
        Self {
            frame: CTRL_KEY,
            value: mode as i32,
        }
    }

    pub const fn end() -> Self {
        Self {
            frame: END_KEY,
            value: 0,
        }
    }

    #[inline]
    fn is_ctrl(&self) -> bool {
        self.frame == CTRL_KEY
    }

    #[inline]
    fn is_end(&self) -> bool {
        self.frame == END_KEY
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackMode {
    Step = 0,
    Linear = 1,
    Smooth = 2,
    Ramp = 3,
    Trigger = 4,
    Event = 5,
}

impl TrackMode {
    pub fn from_tag(tag: i32) -> Option<Self> {
        Some(match tag {
            0 => TrackMode::Step,
            1 => TrackMode::Linear,
            2 => TrackMode::Smooth,
            3 => TrackMode::Ramp,
            4 => TrackMode::Trigger,
            5 => TrackMode::Event,
            _ => return None,
        })
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "step" => TrackMode::Step,
            "linear" => TrackMode::Linear,
            "smooth" => TrackMode::Smooth,
            "ramp" => TrackMode::Ramp,
            "trigger" => TrackMode::Trigger,
            "event" => TrackMode::Event,
            _ => return None,
        })
    }

    /// Trigger and event tracks produce pulses rather than a held value.
    #[inline]
    pub fn is_pulse(self) -> bool {
        matches!(self, TrackMode::Trigger | TrackMode::Event)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackError {
    NotFound(String),
    Empty(String),
    InvalidMode { track: String, tag: i32 },
    Unordered { track: String, frame: i32 },
    Parse { line: usize, message: String },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::NotFound(name) => write!(f, "track '{name}' not found"),
            TrackError::Empty(name) => write!(f, "track '{name}' has no keys"),
            TrackError::InvalidMode { track, tag } => {
                write!(f, "track '{track}': invalid mode tag {tag}")
            }
            TrackError::Unordered { track, frame } => {
                write!(f, "track '{track}': key at frame {frame} is out of order")
            }
            TrackError::Parse { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl std::error::Error for TrackError {}

#[derive(Clone, Debug)]
pub struct Track {
    name: String,
    keys: Vec<TrackKey>,
    mode: TrackMode,
    curr: usize,
    next: usize,
    pending: bool,
}

impl Track {
    /// Validate `keys` and position the cursor on the first segment.
    ///
    /// A missing `END_KEY` terminator is appended.
    pub fn new(name: impl Into<String>, mut keys: Vec<TrackKey>) -> Result<Self, TrackError> {
        let name = name.into();
        if let Some(pos) = keys.iter().position(TrackKey::is_end) {
            keys.truncate(pos);
        }

        let mut last_frame = i32::MIN;
        let mut prev_ctrl = false;
        let mut plain = 0usize;
        for key in &keys {
            if key.is_ctrl() {
                if TrackMode::from_tag(key.value).is_none() {
                    return Err(TrackError::InvalidMode {
                        track: name,
                        tag: key.value,
                    });
                }
                // Two control keys in a row would leave the cursor on a control key.
                if prev_ctrl {
                    return Err(TrackError::Unordered {
                        track: name,
                        frame: key.frame,
                    });
                }
                prev_ctrl = true;
                continue;
            }
            prev_ctrl = false;
            if key.frame < 0 || key.frame < last_frame {
                return Err(TrackError::Unordered {
                    track: name,
                    frame: key.frame,
                });
            }
            last_frame = key.frame;
            plain += 1;
        }
        if plain == 0 {
            return Err(TrackError::Empty(name));
        }

        keys.push(TrackKey::end());
        let mut track = Self {
            name,
            keys,
            mode: TrackMode::Linear,
            curr: 0,
            next: 0,
            pending: true,
        };
        track.reset();
        Ok(track)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> TrackMode {
        self.mode
    }

    pub fn keys(&self) -> &[TrackKey] {
        &self.keys
    }

    /// Index of the key the cursor currently sits on.
    pub fn cursor(&self) -> usize {
        self.curr
    }

    /// Rewind to the first segment.
    pub fn reset(&mut self) {
        self.mode = TrackMode::Linear;
        self.pending = true;
        self.advance(0);
    }

    fn advance(&mut self, mut curr: usize) {
        if self.keys[curr].is_ctrl() {
            if let Some(mode) = TrackMode::from_tag(self.keys[curr].value) {
                self.mode = mode;
            }
            curr += 1;
        }
        self.curr = curr;

        let mut next = curr + 1;
        if self.keys[next].is_ctrl() {
            next += 1;
        }
        self.next = next;
        self.pending = true;
    }

    /// Value at `frame`. Frames must not decrease between calls.
    pub fn evaluate(&mut self, frame: i32) -> i32 {
        let curr = self.keys[self.curr];
        if frame < curr.frame {
            return if self.mode.is_pulse() { 0 } else { curr.value };
        }

        while !self.keys[self.next].is_end() && frame >= self.keys[self.next].frame {
            self.advance(self.curr + 1);
        }

        let curr = self.keys[self.curr];
        let next = self.keys[self.next];
        if next.is_end() && !self.mode.is_pulse() {
            return curr.value;
        }

        // Values span the whole i32 range, so blend in i64 and saturate.
        let step = i64::from(frame) - i64::from(curr.frame);
        let interval = i64::from(next.frame) - i64::from(curr.frame);
        let base = i64::from(curr.value);
        let delta = i64::from(next.value) - base;

        let value = match self.mode {
            TrackMode::Step => base,
            TrackMode::Linear => {
                let scaled = i128::from(delta) * i128::from(step);
                let den = i128::from(interval);
                base + if den == 0 { 0 } else { (scaled / den) as i64 }
            }
            TrackMode::Smooth => {
                let t = div_or_zero((step << FX12_SHIFT) / 2, interval) as i32;
                let k = (FX12_ONE - sin(t + SIN_HALF_PI)) / 2;
                base + ((delta * i64::from(k)) >> FX12_SHIFT)
            }
            TrackMode::Ramp => {
                let t = div_or_zero(step << FX12_SHIFT, interval);
                let k = (t * t) >> FX12_SHIFT;
                base + ((delta * k) >> FX12_SHIFT)
            }
            TrackMode::Trigger => (base - step).max(0),
            TrackMode::Event => {
                if !self.pending {
                    return 0;
                }
                self.pending = false;
                base
            }
        };
        value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

/// Handle returned by `TrackSet::find`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrackId(usize);

/// All tracks registered for an effect.
#[derive(Clone, Debug, Default)]
pub struct TrackSet {
    tracks: Vec<Track>,
}

impl TrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, track: Track) -> TrackId {
        log::debug!("[Sync] Registered track '{}'", track.name());
        self.tracks.push(track);
        TrackId(self.tracks.len() - 1)
    }

    /// Linear scan by name; meant for setup, not per frame.
    pub fn find(&self, name: &str) -> Result<TrackId, TrackError> {
        self.tracks
            .iter()
            .position(|t| t.name == name)
            .map(TrackId)
            .ok_or_else(|| TrackError::NotFound(name.to_string()))
    }

    pub fn get(&self, id: TrackId) -> &Track {
        &self.tracks[id.0]
    }

    pub fn value(&mut self, id: TrackId, frame: i32) -> i32 {
        self.tracks[id.0].evaluate(frame)
    }

    pub fn reset_all(&mut self) {
        for track in &mut self.tracks {
            log::info!("[Sync] Initializing track '{}'", track.name);
            track.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(mode: TrackMode, keys: &[(i32, i32)]) -> Track {
        let mut v = vec![TrackKey::mode(mode)];
        v.extend(keys.iter().map(|&(f, x)| TrackKey::new(f, x)));
        Track::new("t", v).unwrap()
    }

    #[test]
    fn linear_interpolates_and_holds() {
        let mut t = track(TrackMode::Linear, &[(0, 0), (10, 100)]);
        assert_eq!(t.evaluate(0), 0);
        assert_eq!(t.evaluate(5), 50);
        assert_eq!(t.evaluate(10), 100);
        assert_eq!(t.evaluate(15), 100);
    }

    #[test]
    fn default_mode_is_linear() {
        let mut t = Track::new("t", vec![TrackKey::new(0, 0), TrackKey::new(4, 8)]).unwrap();
        assert_eq!(t.mode(), TrackMode::Linear);
        assert_eq!(t.evaluate(2), 4);
    }

    #[test]
    fn before_first_key() {
        let mut held = track(TrackMode::Linear, &[(10, 7), (20, 9)]);
        assert_eq!(held.evaluate(3), 7);
        let mut pulse = track(TrackMode::Trigger, &[(10, 7), (20, 9)]);
        assert_eq!(pulse.evaluate(3), 0);
        let mut event = track(TrackMode::Event, &[(10, 7), (20, 9)]);
        assert_eq!(event.evaluate(3), 0);
    }

    #[test]
    fn step_holds_current_key() {
        let mut t = track(TrackMode::Step, &[(0, 3), (10, 9), (20, 1)]);
        assert_eq!(t.evaluate(0), 3);
        assert_eq!(t.evaluate(9), 3);
        assert_eq!(t.evaluate(10), 9);
        assert_eq!(t.evaluate(25), 1);
    }

    #[test]
    fn event_fires_once_per_segment() {
        let mut t = track(TrackMode::Event, &[(0, 5), (10, 7), (20, 0)]);
        assert_eq!(t.evaluate(0), 5);
        assert_eq!(t.evaluate(1), 0);
        assert_eq!(t.evaluate(9), 0);
        assert_eq!(t.evaluate(12), 7);
        assert_eq!(t.evaluate(13), 0);
    }

    #[test]
    fn event_fires_when_segment_is_skipped_into() {
        let mut t = track(TrackMode::Event, &[(0, 1), (10, 2), (20, 3), (30, 0)]);
        assert_eq!(t.evaluate(0), 1);
        // Jumping over a whole segment still fires the one we land in once.
        assert_eq!(t.evaluate(25), 3);
        assert_eq!(t.evaluate(26), 0);
    }

    #[test]
    fn trigger_decays_to_zero() {
        let mut t = track(TrackMode::Trigger, &[(0, 3), (100, 0)]);
        assert_eq!(t.evaluate(0), 3);
        assert_eq!(t.evaluate(1), 2);
        assert_eq!(t.evaluate(3), 0);
        assert_eq!(t.evaluate(50), 0);
    }

    #[test]
    fn smooth_is_symmetric_ease() {
        let mut t = track(TrackMode::Smooth, &[(0, 0), (100, 1000)]);
        assert_eq!(t.evaluate(0), 0);
        let quarter = t.evaluate(25);
        let half = t.evaluate(50);
        let three_quarters = t.evaluate(75);
        assert!((495..=505).contains(&half), "half = {half}");
        // Smoothstep(0.25) = 0.15625; allow the table's small deviation.
        assert!((140..=160).contains(&quarter), "quarter = {quarter}");
        assert!((840..=860).contains(&three_quarters));
        assert_eq!(t.evaluate(100), 1000);
    }

    #[test]
    fn ramp_is_quadratic() {
        let mut t = track(TrackMode::Ramp, &[(0, 0), (100, 1000)]);
        assert_eq!(t.evaluate(0), 0);
        let half = t.evaluate(50);
        assert!((245..=255).contains(&half), "half = {half}");
        assert_eq!(t.evaluate(100), 1000);
    }

    #[test]
    fn large_values_do_not_overflow() {
        let mut linear = track(TrackMode::Linear, &[(0, 0), (100_000, 100_000)]);
        assert_eq!(linear.evaluate(50_000), 50_000);

        let mut smooth = track(TrackMode::Smooth, &[(0, 0), (10, 2_000_000)]);
        let mid = smooth.evaluate(5);
        assert!((990_000..=1_010_000).contains(&mid), "mid = {mid}");

        let mut full = track(TrackMode::Linear, &[(0, i32::MIN), (2, i32::MAX)]);
        assert_eq!(full.evaluate(1), -1);
        assert_eq!(full.evaluate(2), i32::MAX);

        let mut ramp = track(TrackMode::Ramp, &[(0, i32::MAX), (4, i32::MIN)]);
        assert_eq!(ramp.evaluate(0), i32::MAX);
        assert!(ramp.evaluate(2) > 0);
    }

    #[test]
    fn long_segments_keep_their_shape() {
        let mut smooth = track(TrackMode::Smooth, &[(0, 0), (1 << 24, 1000)]);
        let half = smooth.evaluate(1 << 23);
        assert!((495..=505).contains(&half), "half = {half}");

        let mut ramp = track(TrackMode::Ramp, &[(0, 0), (1 << 24, 1000)]);
        let half = ramp.evaluate(1 << 23);
        assert!((245..=255).contains(&half), "half = {half}");

        let mut trigger = track(TrackMode::Trigger, &[(0, i32::MIN + 1), (i32::MAX - 1, 0)]);
        assert_eq!(trigger.evaluate(i32::MAX - 2), 0);
    }

    #[test]
    fn control_key_switches_mode_mid_sequence() {
        let keys = vec![
            TrackKey::mode(TrackMode::Step),
            TrackKey::new(0, 10),
            TrackKey::new(10, 20),
            TrackKey::mode(TrackMode::Linear),
            TrackKey::new(20, 40),
            TrackKey::new(30, 40),
        ];
        let mut t = Track::new("t", keys).unwrap();
        assert_eq!(t.evaluate(5), 10);
        assert_eq!(t.mode(), TrackMode::Step);
        // Second segment is still step: the control key sits between 10 and 20.
        assert_eq!(t.evaluate(15), 20);
        assert_eq!(t.evaluate(25), 40);
        assert_eq!(t.mode(), TrackMode::Linear);
    }

    #[test]
    fn control_key_applies_to_the_following_segment() {
        let keys = vec![
            TrackKey::new(0, 0),
            TrackKey::mode(TrackMode::Step),
            TrackKey::new(10, 100),
            TrackKey::new(20, 200),
        ];
        let mut t = Track::new("t", keys).unwrap();
        assert_eq!(t.evaluate(5), 50);
        assert_eq!(t.evaluate(15), 100);
    }

    #[test]
    fn reset_rewinds_cursor() {
        let mut t = track(TrackMode::Event, &[(0, 4), (10, 0)]);
        assert_eq!(t.evaluate(0), 4);
        assert_eq!(t.evaluate(1), 0);
        t.reset();
        assert_eq!(t.cursor(), 1);
        assert_eq!(t.evaluate(0), 4);
    }

    #[test]
    fn rejects_bad_key_lists() {
        assert_eq!(
            Track::new("a", vec![]).unwrap_err(),
            TrackError::Empty("a".into())
        );
        assert_eq!(
            Track::new("b", vec![TrackKey::mode(TrackMode::Step)]).unwrap_err(),
            TrackError::Empty("b".into())
        );
        assert!(matches!(
            Track::new("c", vec![TrackKey::new(CTRL_KEY, 42), TrackKey::new(0, 0)]),
            Err(TrackError::InvalidMode { tag: 42, .. })
        ));
        assert!(matches!(
            Track::new("d", vec![TrackKey::new(10, 0), TrackKey::new(5, 0)]),
            Err(TrackError::Unordered { frame: 5, .. })
        ));
    }

    #[test]
    fn explicit_terminator_drops_trailing_keys() {
        let t = Track::new(
            "t",
            vec![TrackKey::new(0, 1), TrackKey::end(), TrackKey::new(5, 2)],
        )
        .unwrap();
        assert_eq!(t.keys(), &[TrackKey::new(0, 1), TrackKey::end()]);
    }

    #[test]
    fn lookup_reports_not_found() {
        let mut set = TrackSet::new();
        let id = set.add(track(TrackMode::Step, &[(0, 1)]));
        assert_eq!(set.find("t"), Ok(id));
        assert_eq!(set.find("nope"), Err(TrackError::NotFound("nope".into())));
        assert_eq!(set.value(id, 100), 1);
    }
}
