//! WebVTT cue timecode shifting.
//!
//! The extracted subtitle tracks follow the feature's own timeline; once an
//! intro clip is prepended the cues must all move forward by the intro
//! duration. Cue timing lines look like
//! `00:00:05.000 --> 00:00:07.500 [settings]`; the optional settings suffix
//! is preserved untouched.

use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Shift every cue in the WebVTT file at `path` forward by `offset`,
/// rewriting the file in place.
pub fn shift_cues(path: &Path, offset: Duration) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Subtitle(format!("failed to open {}: {e}", path.display())))?;
    let shifted = shift_content(&content, offset)
        .map_err(|e| Error::Subtitle(format!("{}: {e}", path.display())))?;
    std::fs::write(path, shifted)
        .map_err(|e| Error::Subtitle(format!("failed to write {}: {e}", path.display())))?;
    Ok(())
}

/// Shift every timing line in a WebVTT document.
fn shift_content(content: &str, offset: Duration) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(content.len());
    for line in content.lines() {
        if line.contains("-->") {
            out.push_str(&shift_timing_line(line, offset)?);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    Ok(out)
}

/// Shift one `start --> end [settings]` line.
fn shift_timing_line(line: &str, offset: Duration) -> std::result::Result<String, String> {
    let (range, settings) = match line.find("-->") {
        Some(pos) => {
            let (start_part, rest) = line.split_at(pos);
            let rest = &rest[3..];
            // Settings follow the end timestamp, separated by whitespace.
            let end_trimmed = rest.trim_start();
            match end_trimmed.find(char::is_whitespace) {
                Some(ws) => (
                    (start_part.trim(), end_trimmed[..ws].trim()),
                    Some(end_trimmed[ws..].trim_start()),
                ),
                None => ((start_part.trim(), end_trimmed.trim()), None),
            }
        }
        None => return Err(format!("not a timing line: {line}")),
    };

    let start = parse_timestamp(range.0).ok_or_else(|| format!("bad timestamp: {}", range.0))?;
    let end = parse_timestamp(range.1).ok_or_else(|| format!("bad timestamp: {}", range.1))?;

    let mut shifted = format!(
        "{} --> {}",
        format_timestamp(start + offset),
        format_timestamp(end + offset)
    );
    if let Some(settings) = settings {
        if !settings.is_empty() {
            shifted.push(' ');
            shifted.push_str(settings);
        }
    }
    Ok(shifted)
}

/// Parse `HH:MM:SS.mmm` or the short `MM:SS.mmm` form.
fn parse_timestamp(s: &str) -> Option<Duration> {
    let parts: Vec<&str> = s.split(':').collect();
    let (hours, minutes, seconds) = match parts.len() {
        3 => (parts[0].parse::<u64>().ok()?, parts[1], parts[2]),
        2 => (0, parts[0], parts[1]),
        _ => return None,
    };
    let minutes: u64 = minutes.parse().ok()?;

    let (secs, millis) = match seconds.split_once('.') {
        Some((s, ms)) => {
            // Normalize fractional part to milliseconds.
            let mut ms = ms.to_string();
            while ms.len() < 3 {
                ms.push('0');
            }
            (s.parse::<u64>().ok()?, ms[..3].parse::<u64>().ok()?)
        }
        None => (seconds.parse::<u64>().ok()?, 0),
    };

    Some(Duration::from_millis(
        ((hours * 60 + minutes) * 60 + secs) * 1000 + millis,
    ))
}

/// Format as `HH:MM:SS.mmm`.
fn format_timestamp(d: Duration) -> String {
    let total_millis = d.as_millis();
    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;
    let seconds = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_form() {
        assert_eq!(
            parse_timestamp("00:00:05.000"),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            parse_timestamp("01:02:03.450"),
            Some(Duration::from_millis(3_723_450))
        );
    }

    #[test]
    fn parse_short_form() {
        assert_eq!(parse_timestamp("02:03.450"), Some(Duration::from_millis(123_450)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_timestamp("garbage"), None);
        assert_eq!(parse_timestamp("1:2:3:4"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn format_roundtrip() {
        assert_eq!(format_timestamp(Duration::from_secs(5)), "00:00:05.000");
        assert_eq!(
            format_timestamp(Duration::from_millis(3_723_450)),
            "01:02:03.450"
        );
    }

    #[test]
    fn shift_moves_cue_forward() {
        let line = "00:00:05.000 --> 00:00:07.500";
        let shifted = shift_timing_line(line, Duration::from_secs(10)).unwrap();
        assert_eq!(shifted, "00:00:15.000 --> 00:00:17.500");
    }

    #[test]
    fn shift_preserves_cue_settings() {
        let line = "00:00:05.000 --> 00:00:07.500 line:85% align:center";
        let shifted = shift_timing_line(line, Duration::from_secs(10)).unwrap();
        assert_eq!(
            shifted,
            "00:00:15.000 --> 00:00:17.500 line:85% align:center"
        );
    }

    #[test]
    fn shift_content_leaves_text_untouched() {
        let doc = "WEBVTT\n\n1\n00:00:05.000 --> 00:00:07.500\nHello there\n";
        let shifted = shift_content(doc, Duration::from_secs(10)).unwrap();
        assert_eq!(
            shifted,
            "WEBVTT\n\n1\n00:00:15.000 --> 00:00:17.500\nHello there\n"
        );
    }

    #[test]
    fn shift_fails_on_bad_timestamp() {
        let doc = "WEBVTT\n\nbogus --> 00:00:07.500\n";
        assert!(shift_content(doc, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn shift_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subtitle_3.vtt");
        std::fs::write(&path, "WEBVTT\n\n00:00:05.000 --> 00:00:06.000\nHi\n").unwrap();

        shift_cues(&path, Duration::from_secs_f64(10.0)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("00:00:15.000 --> 00:00:16.000"));
    }
}
