// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::path::Path;
use std::time::Duration;

/// Extracts a displayable file name from a path, returning a fallback if the name is unreadable.
pub fn filename_display(path: &Path) -> &str {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("unreadable file name")
}

/// Formats a sample length as minutes:seconds.milliseconds. Samples are
/// usually short, so the milliseconds matter.
pub fn sample_length_display(duration: Duration) -> String {
    let minutes = duration.as_secs() / 60;
    let secs = duration.as_secs() % 60;
    format!("{}:{:02}.{:03}", minutes, secs, duration.subsec_millis())
}

/// Number of ticks covering `seconds` at `tick_rate` ticks per second.
/// Negative or non-finite inputs yield zero.
pub fn seconds_to_ticks(seconds: f64, tick_rate: u32) -> usize {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * tick_rate as f64).round() as usize
}

#[cfg(test)]
mod test {
    use std::path::Path;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_sample_length_strings() {
        assert_eq!("0:00.000", sample_length_display(Duration::ZERO));
        assert_eq!("0:00.010", sample_length_display(Duration::from_millis(10)));
        assert_eq!("0:05.250", sample_length_display(Duration::from_millis(5250)));
        assert_eq!("2:05.000", sample_length_display(Duration::new(125, 0)));
    }

    #[test]
    fn test_seconds_to_ticks() {
        assert_eq!(seconds_to_ticks(1.0, 44100), 44100);
        assert_eq!(seconds_to_ticks(0.01, 44100), 441);
        assert_eq!(seconds_to_ticks(-1.0, 44100), 0);
        assert_eq!(seconds_to_ticks(f64::NAN, 44100), 0);
    }

    #[test]
    fn test_filename_display() {
        assert_eq!(filename_display(Path::new("/samples/kick.wav")), "kick.wav");
        assert_eq!(filename_display(Path::new("/")), "unreadable file name");
    }
}
