mod types;

pub use types::*;

use std::path::Path;

use crate::error::{Error, Result};

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from the default locations, or return the default config when
/// no file is found.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./vodforge.toml",
        "~/.config/vodforge/config.toml",
        "/etc/vodforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration.
fn validate_config(config: &Config) -> Result<()> {
    if config.transcode.segment_seconds == 0 {
        return Err(Error::Config("segment_seconds cannot be 0".into()));
    }

    for (field, scale) in [
        ("scale", &config.transcode.scale),
        ("scale_21x9", &config.transcode.scale_21x9),
    ] {
        if !is_valid_scale(scale) {
            return Err(Error::Config(format!(
                "{field} must look like W:H, got {scale:?}"
            )));
        }
    }

    Ok(())
}

fn is_valid_scale(scale: &str) -> bool {
    let parts: Vec<&str> = scale.split(':').collect();
    parts.len() == 2 && parts.iter().all(|p| p.parse::<u32>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.metadata.language, "fr");
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.transcode.segment_seconds, 10);
        assert_eq!(config.transcode.scale, "1280:720");
    }

    #[test]
    fn parses_full_file() {
        let toml = r#"
            [metadata]
            api_key = "abc"
            language = "en"
            region = "us"

            [cache]
            backend = "redis"
            redis_addr = "redis.internal:6379"

            [storage]
            endpoint = "https://s3.example.com"
            region = "eu-west-1"
            bucket = "media"
            access_key = "ak"
            secret_key = "sk"

            [transcode]
            intro_path = "/assets/intro.mkv"
            intro_path_21x9 = "/assets/intro_21-9.mkv"
            output_root = "/srv/media"
            segment_seconds = 6
            scale = "1920:1080"
            scale_21x9 = "1920:816"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.metadata.api_key, "abc");
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.storage.bucket, "media");
        assert_eq!(config.transcode.segment_seconds, 6);
    }

    #[test]
    fn rejects_zero_segment_duration() {
        let toml = "[transcode]\nsegment_seconds = 0\n";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_malformed_scale() {
        let toml = "[transcode]\nscale = \"1280x720\"\n";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn scale_validation() {
        assert!(is_valid_scale("1280:720"));
        assert!(!is_valid_scale("1280"));
        assert!(!is_valid_scale("w:h"));
        assert!(!is_valid_scale("1280:720:1"));
    }
}
