mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use vodforge::config::{self, Config};
use vodforge::storage::{ObjectStorage, S3Bucket};
use vodforge::transcode::{SystemRunner, TranscodeSettings, Transcoder};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn transcode_settings(config: &Config) -> TranscodeSettings {
    TranscodeSettings {
        intro_path: config.transcode.intro_path.clone(),
        intro_path_21x9: config.transcode.intro_path_21x9.clone(),
        output_root: config.transcode.output_root.clone(),
        segment_seconds: config.transcode.segment_seconds,
        scale: config.transcode.scale.clone(),
        scale_21x9: config.transcode.scale_21x9.clone(),
    }
}

fn object_storage(config: &Config) -> Result<ObjectStorage> {
    if config.storage.bucket.is_empty() {
        anyhow::bail!("storage.bucket is not configured");
    }
    let bucket = S3Bucket::new(
        &config.storage.access_key,
        &config.storage.secret_key,
        &config.storage.endpoint,
        &config.storage.region,
        &config.storage.bucket,
    )?;
    Ok(ObjectStorage::new(Arc::new(bucket)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Prepare {
            input,
            media_id,
            skip_upload,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let transcoder = Transcoder::new(transcode_settings(&config));
            let response = transcoder.prepare(&input, &media_id).await?;

            if !skip_upload {
                let storage = object_storage(&config)?;
                let local = config.transcode.output_root.join(&media_id);
                storage.upload_media_files(&media_id, &local).await?;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Delete { media_id } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let storage = object_storage(&config)?;
            storage.delete_media_files(&media_id).await?;
            println!("removed objects under {media_id}/");
        }

        Commands::Probe { file } => {
            let runner = SystemRunner;
            let info = vodforge::transcode::probe::stream_info(&runner, &file).await?;
            println!("video codec:  {}", info.video_codec.as_deref().unwrap_or("none"));
            println!(
                "aspect ratio: {}",
                info.aspect_ratio.as_deref().unwrap_or("unknown")
            );
            println!("audio streams:    {:?}", info.audio_streams);
            println!("subtitle streams: {:?}", info.subtitle_streams);
        }

        Commands::CheckTools => {
            let mut ok = true;
            for tool in ["ffmpeg", "ffprobe"] {
                match which::which(tool) {
                    Ok(path) => println!("{tool}: {}", path.display()),
                    Err(_) => {
                        println!("{tool}: NOT FOUND");
                        ok = false;
                    }
                }
            }
            if !ok {
                anyhow::bail!("missing required tools");
            }
        }

        Commands::Validate { config: path } => {
            let path = path.or(cli.config);
            config::load_config_or_default(path.as_deref())?;
            println!("configuration OK");
        }
    }

    Ok(())
}
