//! HLS preparation pipeline.
//!
//! A prepare job probes the source container, picks an output geometry from
//! its aspect ratio, concatenates a branded intro clip with the feature, and
//! emits one HLS video playlist, one HLS playlist per audio stream and one
//! shifted WebVTT file per text subtitle stream into
//! `<output_root>/<media_id>/`.
//!
//! Stages run in order (video, audio, subtitles); audio and subtitle
//! extraction each fan out over a bounded worker pool. Any stage failure
//! tears the output directory down before returning: a partial artifact is
//! worse than none.

pub mod command;
pub mod probe;
pub mod vtt;

pub use command::{CommandRunner, SystemRunner, ToolCommand, ToolOutput};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use probe::Geometry;

/// Concurrent ffmpeg runs for audio extraction. Audio re-encoding is
/// CPU-bound; two keeps latency down without starving the host.
const AUDIO_CONCURRENCY: usize = 2;
/// Concurrent ffmpeg runs for subtitle extraction (much lighter work).
const SUBTITLE_CONCURRENCY: usize = 4;

/// Fixed settings for the prepare pipeline.
#[derive(Debug, Clone)]
pub struct TranscodeSettings {
    /// Intro clip prepended to 16:9 sources.
    pub intro_path: PathBuf,
    /// Intro clip prepended to sources wider than 1.8:1.
    pub intro_path_21x9: PathBuf,
    /// Root under which per-media output directories are created.
    pub output_root: PathBuf,
    /// HLS segment duration in seconds.
    pub segment_seconds: u32,
    /// `W:H` output scale for 16:9 sources.
    pub scale: String,
    /// `W:H` output scale for wide sources.
    pub scale_21x9: String,
}

/// One prepared audio track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Playlist filename, `audio_<streamIdx>.m3u8`.
    pub audio_index: String,
}

/// One prepared subtitle track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    /// Track filename, `subtitle_<streamIdx>.vtt`.
    pub subtitle_index: String,
}

/// Artifact manifest returned by a successful prepare job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscodeResponse {
    /// Video playlist filename, always `index.m3u8`.
    pub video_index: String,
    pub audios: Vec<AudioTrack>,
    pub subtitles: Vec<SubtitleTrack>,
}

/// Drives ffprobe/ffmpeg to build the artifact tree for one media item.
pub struct Transcoder {
    settings: TranscodeSettings,
    runner: Arc<dyn CommandRunner>,
}

impl Transcoder {
    /// Transcoder using the real system tools.
    pub fn new(settings: TranscodeSettings) -> Self {
        Self::with_runner(settings, Arc::new(SystemRunner))
    }

    /// Transcoder with a custom [`CommandRunner`].
    pub fn with_runner(settings: TranscodeSettings, runner: Arc<dyn CommandRunner>) -> Self {
        Self { settings, runner }
    }

    /// Run the full prepare pipeline for `input`, writing artifacts to
    /// `<output_root>/<media_id>/`.
    ///
    /// Re-running for the same `media_id` is idempotent: the output
    /// directory is emptied first, so no residue from a prior run survives.
    pub async fn prepare(&self, input: &Path, media_id: &str) -> Result<TranscodeResponse> {
        let started = Instant::now();
        info!(input = %input.display(), media_id, "starting transcode");

        let out_dir = self.settings.output_root.join(media_id);
        prepare_output_dir(&out_dir)?;

        let streams = probe::stream_info(self.runner.as_ref(), input).await?;

        let geometry = probe::pick_geometry(streams.aspect_ratio.as_deref());
        let (intro, scale) = match geometry {
            Geometry::Wide => (&self.settings.intro_path_21x9, &self.settings.scale_21x9),
            Geometry::Standard => (&self.settings.intro_path, &self.settings.scale),
        };
        info!(?geometry, scale = %scale, "output geometry selected");

        // From here on an incomplete artifact tree must not survive an
        // error; the guard removes the directory unless disarmed.
        let guard = CleanupGuard::new(out_dir.clone());

        let video_started = Instant::now();
        self.transcode_video(input, &out_dir, intro, scale).await?;
        info!(elapsed = ?video_started.elapsed(), "video stage done");

        let audio_started = Instant::now();
        self.extract_audio_streams(input, &out_dir, &streams.audio_streams)
            .await?;
        info!(elapsed = ?audio_started.elapsed(), "audio stage done");

        let subtitle_started = Instant::now();
        self.extract_subtitle_streams(input, &out_dir, &streams.subtitle_streams)
            .await?;
        info!(elapsed = ?subtitle_started.elapsed(), "subtitle stage done");

        guard.disarm();
        set_world_accessible(&out_dir);

        let response = TranscodeResponse {
            video_index: "index.m3u8".to_string(),
            audios: streams
                .audio_streams
                .iter()
                .map(|idx| AudioTrack {
                    audio_index: format!("audio_{idx}.m3u8"),
                })
                .collect(),
            subtitles: streams
                .subtitle_streams
                .iter()
                .map(|idx| SubtitleTrack {
                    subtitle_index: format!("subtitle_{idx}.vtt"),
                })
                .collect(),
        };

        info!(
            media_id,
            elapsed = ?started.elapsed(),
            output = %out_dir.display(),
            "transcode finished"
        );
        Ok(response)
    }

    /// Concatenate the intro with the feature and emit the HLS video rung.
    async fn transcode_video(
        &self,
        input: &Path,
        out_dir: &Path,
        intro: &Path,
        scale: &str,
    ) -> Result<()> {
        info!("transcoding video");
        let args = video_args(intro, input, out_dir, scale, self.settings.segment_seconds);
        self.runner.run("ffmpeg", &args).await?;
        debug!("video playlist written");
        Ok(())
    }

    /// Extract every audio stream, at most [`AUDIO_CONCURRENCY`] at a time.
    async fn extract_audio_streams(
        &self,
        input: &Path,
        out_dir: &Path,
        streams: &[u32],
    ) -> Result<()> {
        if streams.is_empty() {
            return Ok(());
        }
        info!(count = streams.len(), "transcoding audio streams");

        let semaphore = Arc::new(Semaphore::new(AUDIO_CONCURRENCY));
        let mut handles: Vec<JoinHandle<Result<()>>> = Vec::with_capacity(streams.len());
        for &idx in streams {
            let runner = Arc::clone(&self.runner);
            let semaphore = Arc::clone(&semaphore);
            let args = audio_args(
                &self.settings.intro_path,
                input,
                out_dir,
                idx,
                self.settings.segment_seconds,
            );
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("audio semaphore closed");
                runner.run("ffmpeg", &args).await?;
                debug!(stream = idx, "audio track extracted");
                Ok(())
            }));
        }
        join_first_error(handles).await
    }

    /// Extract every retained subtitle stream and shift its cues forward by
    /// the intro duration, at most [`SUBTITLE_CONCURRENCY`] at a time.
    async fn extract_subtitle_streams(
        &self,
        input: &Path,
        out_dir: &Path,
        streams: &[u32],
    ) -> Result<()> {
        if streams.is_empty() {
            return Ok(());
        }

        let intro_duration =
            probe::clip_duration(self.runner.as_ref(), &self.settings.intro_path).await?;
        info!(
            count = streams.len(),
            intro_secs = intro_duration.as_secs_f64(),
            "extracting subtitle streams"
        );

        let semaphore = Arc::new(Semaphore::new(SUBTITLE_CONCURRENCY));
        let mut handles: Vec<JoinHandle<Result<()>>> = Vec::with_capacity(streams.len());
        for &idx in streams {
            let runner = Arc::clone(&self.runner);
            let semaphore = Arc::clone(&semaphore);
            let args = subtitle_args(input, out_dir, idx);
            let output_file = out_dir.join(format!("subtitle_{idx}.vtt"));
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("subtitle semaphore closed");
                runner.run("ffmpeg", &args).await?;
                vtt::shift_cues(&output_file, intro_duration)?;
                debug!(stream = idx, "subtitle track extracted");
                Ok(())
            }));
        }
        join_first_error(handles).await
    }
}

/// Create the output directory and delete every file already in it
/// (non-recursive; subdirectories are left alone).
fn prepare_output_dir(out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    for entry in std::fs::read_dir(out_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Mark the finished directory world-accessible so adjacent services can
/// serve the files. Best-effort: a failure is logged, not returned.
fn set_world_accessible(out_dir: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            std::fs::set_permissions(out_dir, std::fs::Permissions::from_mode(0o777))
        {
            warn!(path = %out_dir.display(), error = %e, "failed to set directory permissions");
        }
    }
    #[cfg(not(unix))]
    {
        let _ = out_dir;
    }
}

/// Removes the output directory on drop unless disarmed.
struct CleanupGuard {
    path: PathBuf,
    armed: bool,
}

impl CleanupGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!(path = %self.path.display(), error = %e, "failed to clean up output directory");
            }
        }
    }
}

/// Await every worker, keeping the first error. Peers already started race
/// to completion; their outcomes are discarded once an error is recorded.
async fn join_first_error(handles: Vec<JoinHandle<Result<()>>>) -> Result<()> {
    let mut first_err = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
            Err(e) => {
                if first_err.is_none() {
                    first_err = Some(Error::Internal(format!("worker task failed: {e}")));
                }
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// ffmpeg argument assembly
// ---------------------------------------------------------------------------

fn video_args(
    intro: &Path,
    input: &Path,
    out_dir: &Path,
    scale: &str,
    segment_seconds: u32,
) -> Vec<String> {
    vec![
        "-fflags".into(),
        "+genpts".into(),
        "-i".into(),
        intro.to_string_lossy().into_owned(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-filter_complex".into(),
        format!(
            "[0:v:0]scale={scale},format=yuv420p,setsar=sar=1/1[v0]; \
             [1:v:0]scale={scale},format=yuv420p,setsar=sar=1/1[v1]; \
             [v0][v1]concat=n=2:v=1[outv]"
        ),
        "-map".into(),
        "[outv]".into(),
        "-vsync".into(),
        "2".into(),
        "-c:v".into(),
        "libx264".into(),
        "-profile:v".into(),
        "high".into(),
        "-level".into(),
        "4.0".into(),
        "-crf".into(),
        "25".into(),
        "-preset".into(),
        "superfast".into(),
        "-maxrate".into(),
        "3M".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-hls_time".into(),
        segment_seconds.to_string(),
        "-hls_playlist_type".into(),
        "vod".into(),
        "-hls_segment_filename".into(),
        out_dir.join("segment_%03d.ts").to_string_lossy().into_owned(),
        "-hls_flags".into(),
        "delete_segments".into(),
        "-f".into(),
        "hls".into(),
        out_dir.join("index.m3u8").to_string_lossy().into_owned(),
    ]
}

fn audio_args(
    intro: &Path,
    input: &Path,
    out_dir: &Path,
    stream_index: u32,
    segment_seconds: u32,
) -> Vec<String> {
    vec![
        "-i".into(),
        intro.to_string_lossy().into_owned(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-filter_complex".into(),
        format!("[0:a:0][1:{stream_index}]concat=n=2:v=0:a=1[outa]"),
        "-map".into(),
        "[outa]".into(),
        "-c:a".into(),
        "aac".into(),
        "-b:a".into(),
        "160k".into(),
        "-ac".into(),
        "2".into(),
        "-hls_time".into(),
        segment_seconds.to_string(),
        "-hls_playlist_type".into(),
        "vod".into(),
        "-hls_segment_filename".into(),
        out_dir
            .join(format!("audio_{stream_index}_%03d.ts"))
            .to_string_lossy()
            .into_owned(),
        out_dir
            .join(format!("audio_{stream_index}.m3u8"))
            .to_string_lossy()
            .into_owned(),
    ]
}

fn subtitle_args(input: &Path, out_dir: &Path, stream_index: u32) -> Vec<String> {
    vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-map".into(),
        format!("0:{stream_index}"),
        out_dir
            .join(format!("subtitle_{stream_index}.vtt"))
            .to_string_lossy()
            .into_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_args_shape() {
        let args = video_args(
            Path::new("/assets/intro.mkv"),
            Path::new("/media/film.mkv"),
            Path::new("/out/42"),
            "1280:720",
            10,
        );
        assert_eq!(args[0], "-fflags");
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"/out/42/index.m3u8".to_string()));
        assert!(args.contains(&"/out/42/segment_%03d.ts".to_string()));
        let filter = &args[7];
        assert!(filter.contains("scale=1280:720"));
        assert!(filter.contains("concat=n=2:v=1[outv]"));
        // Intro is the first input, the feature the second.
        assert_eq!(args[3], "/assets/intro.mkv");
        assert_eq!(args[5], "/media/film.mkv");
    }

    #[test]
    fn audio_args_shape() {
        let args = audio_args(
            Path::new("/assets/intro.mkv"),
            Path::new("/media/film.mkv"),
            Path::new("/out/42"),
            3,
            10,
        );
        assert!(args.contains(&"[0:a:0][1:3]concat=n=2:v=0:a=1[outa]".to_string()));
        assert!(args.contains(&"160k".to_string()));
        assert!(args.contains(&"/out/42/audio_3_%03d.ts".to_string()));
        assert_eq!(args.last().unwrap(), "/out/42/audio_3.m3u8");
    }

    #[test]
    fn subtitle_args_shape() {
        let args = subtitle_args(Path::new("/media/film.mkv"), Path::new("/out/42"), 5);
        assert_eq!(
            args,
            vec![
                "-i".to_string(),
                "/media/film.mkv".to_string(),
                "-map".to_string(),
                "0:5".to_string(),
                "/out/42/subtitle_5.vtt".to_string(),
            ]
        );
    }

    #[test]
    fn prepare_output_dir_empties_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("media");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("stale.ts"), b"old").unwrap();

        prepare_output_dir(&out).unwrap();
        assert!(std::fs::read_dir(&out).unwrap().next().is_none());
    }

    #[test]
    fn cleanup_guard_removes_dir_when_armed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("media");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("partial.ts"), b"x").unwrap();

        drop(CleanupGuard::new(out.clone()));
        assert!(!out.exists());
    }

    #[test]
    fn cleanup_guard_keeps_dir_when_disarmed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("media");
        std::fs::create_dir(&out).unwrap();

        let guard = CleanupGuard::new(out.clone());
        guard.disarm();
        assert!(out.exists());
    }
}
