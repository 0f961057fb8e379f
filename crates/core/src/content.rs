//! Training content: resource kinds, answer checking, and upload rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::credentials::require_text;
use crate::error::CoreError;

pub const RESOURCE_VIDEO: &str = "video";
pub const RESOURCE_LINK: &str = "link";
pub const RESOURCE_FILE: &str = "file";

pub const VALID_RESOURCE_KINDS: &[&str] = &[RESOURCE_VIDEO, RESOURCE_LINK, RESOURCE_FILE];

/// File extensions accepted for content and document uploads.
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "pdf"];

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([\w-]+)")
        .expect("valid regex")
});

pub fn validate_resource_kind(kind: &str) -> Result<(), CoreError> {
    if VALID_RESOURCE_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid resource kind '{kind}'. Must be one of: {}",
            VALID_RESOURCE_KINDS.join(", ")
        )))
    }
}

/// Link-backed kinds need a URL. File resources get their path from the upload.
pub fn validate_resource(kind: &str, link: Option<&str>) -> Result<(), CoreError> {
    validate_resource_kind(kind)?;
    if kind != RESOURCE_FILE && link.map(str::trim).unwrap_or("").is_empty() {
        return Err(CoreError::Validation(format!(
            "A '{kind}' resource requires a link"
        )));
    }
    Ok(())
}

/// Split the comma-separated answer options, dropping blanks.
pub fn parse_answer_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trimmed, case-insensitive comparison.
pub fn answer_is_correct(given: &str, correct: &str) -> bool {
    given.trim().to_lowercase() == correct.trim().to_lowercase()
}

/// Validate the question block of a content item.
///
/// When options are offered, the correct answer must be one of them.
pub fn validate_question(
    subject: &str,
    question: &str,
    options: &[String],
    correct_answer: &str,
) -> Result<(), CoreError> {
    require_text("subject", subject)?;
    require_text("question", question)?;
    require_text("correct_answer", correct_answer)?;
    if !options.is_empty() && !options.iter().any(|o| answer_is_correct(o, correct_answer)) {
        return Err(CoreError::Validation(format!(
            "Correct answer '{correct_answer}' is not among the options"
        )));
    }
    Ok(())
}

/// Extract the video id from a YouTube URL, or return the input unchanged.
pub fn youtube_id(url: &str) -> String {
    YOUTUBE_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| url.to_string())
}

/// Lowercased extension of a file name, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

pub fn is_allowed_upload(filename: &str) -> bool {
    file_extension(filename)
        .map(|ext| ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied file name to a safe, flat name.
///
/// Path components are dropped, whitespace becomes `_`, and anything other
/// than ASCII letters, digits, `.`, `_` and `-` is removed. Leading dots are
/// stripped so the result can never be hidden or climb directories.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_ids_are_extracted() {
        assert_eq!(youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(youtube_id("https://youtu.be/abc-123_x"), "abc-123_x");
        assert_eq!(youtube_id("https://example.com/video"), "https://example.com/video");
    }

    #[test]
    fn answers_compare_loosely() {
        assert!(answer_is_correct("  Opção A ", "opção a"));
        assert!(!answer_is_correct("B", "A"));
    }

    #[test]
    fn options_are_split_and_trimmed() {
        assert_eq!(parse_answer_options("A, B,,C "), vec!["A", "B", "C"]);
        assert!(parse_answer_options("").is_empty());
    }

    #[test]
    fn correct_answer_must_be_an_option() {
        let options = parse_answer_options("Sim,Não");
        assert!(validate_question("Freios", "Verificou?", &options, "sim").is_ok());
        assert!(validate_question("Freios", "Verificou?", &options, "Talvez").is_err());
        assert!(validate_question("Freios", "Verificou?", &[], "Livre").is_ok());
        assert!(validate_question("", "Verificou?", &[], "x").is_err());
    }

    #[test]
    fn link_kinds_need_a_link() {
        assert!(validate_resource(RESOURCE_VIDEO, Some("https://youtu.be/x")).is_ok());
        assert!(validate_resource(RESOURCE_LINK, Some("  ")).is_err());
        assert!(validate_resource(RESOURCE_FILE, None).is_ok());
        assert!(validate_resource("audio", None).is_err());
    }

    #[test]
    fn upload_whitelist() {
        assert!(is_allowed_upload("manual.PDF"));
        assert!(is_allowed_upload("foto.jpeg"));
        assert!(!is_allowed_upload("script.sh"));
        assert!(!is_allowed_upload("noextension"));
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\Manual de Freios.pdf"), "Manual_de_Freios.pdf");
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename("relatório.pdf"), "relatrio.pdf");
    }
}
