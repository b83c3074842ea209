use crate::error::AppError;

/// Declared media types accepted for upload.
///
/// `application/octet-stream` is on the list because some recorders upload
/// audio without a specific MIME type. Only the declared header is checked,
/// the file content is never sniffed.
pub const ALLOWED_AUDIO_CONTENT_TYPES: &[&str] = &[
    "audio/aac",
    "audio/wav",
    "audio/mp3",
    "application/octet-stream",
];

/// Returns true when the declared content type is on the audio allow-list.
///
/// Parameters such as `; charset=binary` are ignored; type and subtype must match exactly.
pub fn is_audio_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .parse::<mime::Mime>()
        .map(|parsed| {
            let essence = parsed.essence_str().to_ascii_lowercase();
            ALLOWED_AUDIO_CONTENT_TYPES.contains(&essence.as_str())
        })
        .unwrap_or(false)
}

pub fn validate_audio_content_type(content_type: Option<&str>) -> Result<(), AppError> {
    match content_type {
        Some(declared) if is_audio_content_type(declared) => Ok(()),
        Some(declared) => Err(AppError::InvalidContentType(declared.to_string())),
        None => Err(AppError::InvalidContentType("<missing>".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_allowed_type() {
        for declared in ALLOWED_AUDIO_CONTENT_TYPES {
            assert!(
                validate_audio_content_type(Some(declared)).is_ok(),
                "{declared} should be accepted"
            );
        }
    }

    #[test]
    fn rejects_text_plain() {
        let result = validate_audio_content_type(Some("text/plain"));
        assert!(matches!(result, Err(AppError::InvalidContentType(t)) if t == "text/plain"));
    }

    #[test]
    fn rejects_missing_header() {
        assert!(matches!(
            validate_audio_content_type(None),
            Err(AppError::InvalidContentType(_))
        ));
    }

    #[test]
    fn ignores_parameters_and_case() {
        assert!(is_audio_content_type("Audio/MP3; charset=binary"));
        assert!(!is_audio_content_type("audio/mpeg"));
        assert!(!is_audio_content_type("not a mime"));
    }
}
