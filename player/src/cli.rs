use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tts_client::SpeakOverrides;

/// Command-line arguments for tts-player
#[derive(Debug, Parser)]
#[command(name = "tts-player")]
#[command(about = "Stream speech from a GPT-SoVITS service and play it")]
#[command(version)]
pub struct Cli {
    /// Base URL of the synthesis service
    #[arg(long, global = true, env = "TTS_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Synthesize text and play it as it streams in
    Speak {
        text: String,
        #[command(flatten)]
        voice: VoiceArgs,
        /// Output device name (defaults to the system default)
        #[arg(long)]
        device: Option<String>,
    },
    /// Synthesize text and save the response to a file
    Save {
        text: String,
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        voice: VoiceArgs,
    },
    /// Play a WAV file from disk
    PlayFile {
        path: PathBuf,
        #[arg(long)]
        device: Option<String>,
    },
    /// List output devices
    Devices,
}

#[derive(Debug, Clone, Default, Args)]
pub struct VoiceArgs {
    #[arg(long)]
    pub text_lang: Option<String>,
    #[arg(long)]
    pub prompt_lang: Option<String>,
    /// Reference audio path, as seen by the synthesis service
    #[arg(long)]
    pub ref_audio: Option<String>,
    #[arg(long)]
    pub prompt_text: Option<String>,
    #[arg(long)]
    pub temperature: Option<f64>,
    #[arg(long)]
    pub fragment_interval: Option<f64>,
    #[arg(long)]
    pub speed_factor: Option<f64>,
    #[arg(long)]
    pub seed: Option<i64>,
}

impl VoiceArgs {
    pub fn overrides(&self) -> SpeakOverrides {
        SpeakOverrides {
            text_lang: self.text_lang.clone(),
            prompt_lang: self.prompt_lang.clone(),
            ref_audio_path: self.ref_audio.clone(),
            prompt_text: self.prompt_text.clone(),
            temperature: self.temperature,
            fragment_interval: self.fragment_interval,
            speed_factor: self.speed_factor,
            seed: self.seed,
            ..SpeakOverrides::default()
        }
    }
}
