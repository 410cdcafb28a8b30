//! Text authoring format for timeline tracks.
//!
//! ```text
//! # comment
//! track scroll
//!   mode step        # control key, leading or mid-sequence
//!   0 1              # frame value
//!   600 2
//! end
//! ```
//!
//! Blank lines and `#` comments are ignored. Each `track` block must be closed
//! by `end`.

use super::{Track, TrackError, TrackKey, TrackMode, TrackSet};

fn parse_error(line: usize, message: impl Into<String>) -> TrackError {
    TrackError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_int(line: usize, word: &str) -> Result<i32, TrackError> {
    word.parse::<i32>()
        .map_err(|_| parse_error(line, format!("expected an integer, found '{word}'")))
}

impl TrackSet {
    /// Parse every track block in `text`.
    pub fn parse(text: &str) -> Result<Self, TrackError> {
        let mut set = TrackSet::new();
        let mut open: Option<(String, Vec<TrackKey>)> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let words: Vec<&str> = content.split_whitespace().collect();

            match (words[0], open.as_mut()) {
                ("track", None) => {
                    let [_, name] = words[..] else {
                        return Err(parse_error(line, "usage: track <name>"));
                    };
                    if set.find(name).is_ok() {
                        return Err(parse_error(line, format!("duplicate track '{name}'")));
                    }
                    open = Some((name.to_string(), Vec::new()));
                }
                ("track", Some(_)) => {
                    return Err(parse_error(line, "'track' inside an unterminated track"));
                }
                ("end", Some(_)) => {
                    if let Some((name, keys)) = open.take() {
                        let track = Track::new(name, keys)?;
                        set.add(track);
                    }
                }
                ("mode", Some((_, keys))) => {
                    let [_, name] = words[..] else {
                        return Err(parse_error(line, "usage: mode <name>"));
                    };
                    let mode = TrackMode::from_name(name)
                        .ok_or_else(|| parse_error(line, format!("unknown mode '{name}'")))?;
                    keys.push(TrackKey::mode(mode));
                }
                (first, Some((_, keys))) => {
                    let [_, value] = words[..] else {
                        return Err(parse_error(line, "expected '<frame> <value>'"));
                    };
                    keys.push(TrackKey::new(parse_int(line, first)?, parse_int(line, value)?));
                }
                (other, None) => {
                    return Err(parse_error(line, format!("unexpected '{other}' outside a track")));
                }
            }
        }

        if let Some((name, _)) = open {
            return Err(parse_error(
                text.lines().count(),
                format!("track '{name}' is missing 'end'"),
            ));
        }
        Ok(set)
    }
}
