// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "prompt3d")]
#[command(about = "Chat with a text-to-3D backend and inspect the results", long_about = None)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = "PROMPT3D_BASE_URL", default_value = "http://localhost:7860")]
    pub base_url: String,

    /// File holding the persisted session id
    #[arg(long, env = "PROMPT3D_STORAGE")]
    pub storage_file: Option<PathBuf>,

    /// Directory exported models are saved into
    #[arg(long, env = "PROMPT3D_DOWNLOAD_DIR")]
    pub download_dir: Option<PathBuf>,

    /// Seconds before a backend request is abandoned
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Run without a window; models are rendered offscreen
    #[arg(long, default_value = "false")]
    pub headless: bool,

    /// Rest loaded models on the ground grid instead of centering them
    #[arg(long, default_value = "false")]
    pub pin_to_ground: bool,

    /// Largest model extent after normalization, in scene units
    #[arg(long, default_value_t = 3.0)]
    pub max_size: f32,

    /// Initial viewer width
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Initial viewer height
    #[arg(long, default_value_t = 768)]
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["prompt3d"]);
        assert_eq!(cli.timeout_secs, 120);
        assert_eq!(cli.max_size, 3.0);
        assert!(!cli.headless);
        assert!(!cli.pin_to_ground);
        assert_eq!((cli.width, cli.height), (1024, 768));
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from([
            "prompt3d",
            "--base-url",
            "http://gen.local:9000",
            "--headless",
            "--pin-to-ground",
            "--download-dir",
            "/tmp/models",
        ]);
        assert_eq!(cli.base_url, "http://gen.local:9000");
        assert!(cli.headless && cli.pin_to_ground);
        assert_eq!(cli.download_dir, Some(PathBuf::from("/tmp/models")));
    }
}
