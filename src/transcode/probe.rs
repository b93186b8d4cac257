//! Source analysis via ffprobe.
//!
//! Streams are enumerated with
//! `ffprobe -show_entries stream=index,codec_name,codec_type,display_aspect_ratio -of csv=p=0`
//! and parsed line by line. Bitmap subtitle formats cannot be converted to
//! WebVTT and are dropped at this stage.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use super::command::CommandRunner;
use crate::error::{Error, Result};

/// Subtitle codecs stored as images rather than text.
const BITMAP_SUBTITLE_CODECS: [&str; 2] = ["dvd_subtitle", "hdmv_pgs_subtitle"];

/// Streams discovered in a source container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamInfo {
    /// Indices of every audio stream.
    pub audio_streams: Vec<u32>,
    /// Indices of text subtitle streams (bitmap formats filtered out).
    pub subtitle_streams: Vec<u32>,
    /// Codec of the first video stream, if any.
    pub video_codec: Option<String>,
    /// Display aspect ratio of the first video stream, as reported
    /// (`"16:9"`-style), if any.
    pub aspect_ratio: Option<String>,
}

/// Output geometry, picked from the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// 16:9-ish sources.
    Standard,
    /// Anamorphic sources wider than 1.8:1.
    Wide,
}

/// Enumerate the streams of `input`.
pub async fn stream_info(runner: &dyn CommandRunner, input: &Path) -> Result<StreamInfo> {
    info!(input = %input.display(), "probing source streams");
    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "stream=index,codec_name,codec_type,display_aspect_ratio".to_string(),
        "-of".to_string(),
        "csv=p=0".to_string(),
        input.to_string_lossy().to_string(),
    ];
    let output = runner.run("ffprobe", &args).await?;
    let info = parse_stream_lines(&output.stdout);
    debug!(
        audio = info.audio_streams.len(),
        subtitles = info.subtitle_streams.len(),
        codec = info.video_codec.as_deref().unwrap_or("none"),
        "probe complete"
    );
    Ok(info)
}

/// Measure a clip's duration via `ffprobe -show_entries format=duration`.
pub async fn clip_duration(runner: &dyn CommandRunner, input: &Path) -> Result<Duration> {
    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        input.to_string_lossy().to_string(),
    ];
    let output = runner.run("ffprobe", &args).await?;
    let secs: f64 = output
        .stdout
        .trim()
        .parse()
        .map_err(|e| Error::Probe(format!("unparseable duration {:?}: {e}", output.stdout.trim())))?;
    Ok(Duration::from_secs_f64(secs))
}

/// Parse the CSV stream listing. Only the first video stream contributes the
/// codec and aspect ratio; malformed lines are skipped.
fn parse_stream_lines(output: &str) -> StreamInfo {
    let mut info = StreamInfo::default();

    for line in output.lines() {
        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields.len() < 3 {
            continue;
        }
        let Ok(index) = fields[0].parse::<u32>() else {
            continue;
        };
        let codec_name = fields[1];
        match fields[2] {
            "audio" => info.audio_streams.push(index),
            "subtitle" => {
                if !BITMAP_SUBTITLE_CODECS.contains(&codec_name) {
                    info.subtitle_streams.push(index);
                } else {
                    debug!(index, codec = codec_name, "dropping bitmap subtitle stream");
                }
            }
            "video" => {
                if info.video_codec.is_some() {
                    continue;
                }
                info.video_codec = Some(codec_name.to_string());
                info.aspect_ratio = fields
                    .get(3)
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string());
            }
            _ => {}
        }
    }

    info
}

/// Pick the output geometry from a `X:Y` aspect-ratio string. Missing or
/// malformed ratios fall back to 16:9; each component falls back on its own
/// when only one side fails to parse.
pub fn pick_geometry(aspect_ratio: Option<&str>) -> Geometry {
    let (x, y) = match aspect_ratio.map(|r| r.split(':').collect::<Vec<&str>>()) {
        Some(parts) if parts.len() == 2 => (
            parts[0].parse::<f64>().unwrap_or(16.0),
            parts[1].parse::<f64>().unwrap_or(9.0),
        ),
        _ => (16.0, 9.0),
    };

    if x / y > 1.8 {
        Geometry::Wide
    } else {
        Geometry::Standard
    }
}
