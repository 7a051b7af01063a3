//! Argument parsing and input checks for the command-line player

use std::path::PathBuf;

use clap::Parser;
use player::cli::{Cli, Command};
use player::commands;
use player::config::PlayerConfig;
use player::error::CliError;
use tts_client::SpeakOverrides;

#[test]
fn test_parse_speak_with_voice_options() {
    let cli = Cli::try_parse_from([
        "tts-player",
        "speak",
        "你好，世界",
        "--text-lang",
        "zh",
        "--temperature",
        "0.6",
        "--seed",
        "42",
        "--device",
        "pulse",
    ])
    .unwrap();

    match cli.command {
        Command::Speak { text, voice, device } => {
            assert_eq!(text, "你好，世界");
            assert_eq!(device.as_deref(), Some("pulse"));

            let overrides = voice.overrides();
            assert_eq!(overrides.text_lang.as_deref(), Some("zh"));
            assert_eq!(overrides.temperature, Some(0.6));
            assert_eq!(overrides.seed, Some(42));
            assert_eq!(overrides.prompt_text, None);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_parse_save_requires_output() {
    assert!(Cli::try_parse_from(["tts-player", "save", "hello"]).is_err());

    let cli = Cli::try_parse_from(["tts-player", "save", "hello", "-o", "out.wav"]).unwrap();
    match cli.command {
        Command::Save { text, output, .. } => {
            assert_eq!(text, "hello");
            assert_eq!(output, PathBuf::from("out.wav"));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_parse_play_file_and_devices() {
    let cli = Cli::try_parse_from(["tts-player", "play-file", "reply.wav"]).unwrap();
    assert!(matches!(cli.command, Command::PlayFile { ref path, device: None } if path == &PathBuf::from("reply.wav")));

    let cli = Cli::try_parse_from(["tts-player", "devices"]).unwrap();
    assert!(matches!(cli.command, Command::Devices));
}

#[test]
fn test_global_base_url() {
    let cli = Cli::try_parse_from(["tts-player", "devices", "--base-url", "http://10.0.0.2:9880"]).unwrap();
    assert_eq!(cli.base_url.as_deref(), Some("http://10.0.0.2:9880"));
}

#[test]
fn test_rejects_non_numeric_temperature() {
    let result = Cli::try_parse_from(["tts-player", "speak", "hi", "--temperature", "warm"]);
    assert!(result.is_err());
}

#[test]
fn test_speak_rejects_blank_text_before_any_request() {
    let result = commands::speak(&PlayerConfig::default(), "   ", &SpeakOverrides::default());
    assert!(matches!(result, Err(CliError::InvalidInput(msg)) if msg.contains("empty")));
}

#[test]
fn test_save_rejects_unknown_language() {
    let overrides = SpeakOverrides {
        text_lang: Some("klingon".to_string()),
        ..SpeakOverrides::default()
    };
    let result = commands::save(&PlayerConfig::default(), "hello", "out.wav".as_ref(), &overrides);
    assert!(matches!(result, Err(CliError::InvalidInput(msg)) if msg.contains("klingon")));
}

#[test]
fn test_speak_rejects_out_of_range_temperature() {
    let overrides = SpeakOverrides {
        temperature: Some(3.0),
        ..SpeakOverrides::default()
    };
    let result = commands::speak(&PlayerConfig::default(), "hello", &overrides);
    assert!(matches!(result, Err(CliError::InvalidInput(_))));
}

#[test]
fn test_play_file_missing_path() {
    let result = commands::play_file(&PlayerConfig::default(), "no/such/file.wav".as_ref());
    assert!(matches!(result, Err(CliError::InvalidInput(msg)) if msg.contains("not found")));
}
