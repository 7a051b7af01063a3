use tts_client::SynthesisRequest;

use crate::error::CliError;

/// Maximum text length for TTS requests, in characters
const MAX_TEXT_LENGTH: usize = 5000;

/// Language tags accepted by the synthesis service
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "zh", "en", "ja", "ko", "yue", "auto", "auto_yue", "all_zh", "all_ja", "all_ko", "all_yue",
];

/// Validate text to synthesize
pub fn validate_text(text: &str) -> Result<(), CliError> {
    if text.trim().is_empty() {
        return Err(CliError::InvalidInput("Text cannot be empty".to_string()));
    }
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(CliError::InvalidInput(format!(
            "Text too long (max {} characters)",
            MAX_TEXT_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_language(lang: &str) -> Result<(), CliError> {
    if !SUPPORTED_LANGUAGES.contains(&lang) {
        return Err(CliError::InvalidInput(format!(
            "Unsupported language: {}. Expected one of: {}",
            lang,
            SUPPORTED_LANGUAGES.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_temperature(temperature: f64) -> Result<(), CliError> {
    if !(temperature > 0.0 && temperature <= 2.0) {
        return Err(CliError::InvalidInput(format!(
            "Temperature must be in (0, 2], got {}",
            temperature
        )));
    }
    Ok(())
}

/// Validate a fully populated synthesis request before it is sent
pub fn validate_request(request: &SynthesisRequest) -> Result<(), CliError> {
    validate_text(&request.text)?;
    validate_language(&request.text_lang)?;
    validate_language(&request.prompt_lang)?;

    if let Some(temperature) = request.temperature {
        validate_temperature(temperature)?;
    }
    if let Some(speed) = request.speed_factor {
        if speed <= 0.0 {
            return Err(CliError::InvalidInput(format!(
                "Speed factor must be positive, got {}",
                speed
            )));
        }
    }
    if let Some(interval) = request.fragment_interval {
        if interval < 0.0 {
            return Err(CliError::InvalidInput(format!(
                "Fragment interval cannot be negative, got {}",
                interval
            )));
        }
    }
    Ok(())
}
