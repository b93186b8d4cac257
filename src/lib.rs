//! Vodforge - media preparation pipeline for video-on-demand backends.
//!
//! Given a source container file, [`transcode`] produces an HLS artifact
//! tree (video playlist, per-track audio playlists, shifted subtitle
//! tracks) prefixed by a branded intro clip, [`storage`] uploads that tree
//! to an S3-compatible bucket, and [`metadata`] enriches catalog entries
//! through a two-tier cache in front of a TMDb-compatible provider.

pub mod config;
pub mod error;
pub mod metadata;
pub mod storage;
pub mod transcode;
