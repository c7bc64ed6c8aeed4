//! Turning operator input into candidate codes.

/// Split free text into candidate codes.
///
/// Codes are separated by line breaks (`\n`, `\r\n`, `\r`) and commas. Tokens are trimmed
/// and empty tokens dropped. Repeats are kept in input order; the store drops them (first
/// occurrence wins, case-sensitive) and reports them as duplicates.
pub fn extract_codes(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .split(['\n', ','])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Decode an uploaded text file. Invalid UTF-8 falls back to Latin-1, which never fails.
pub fn decode_upload(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.strip_prefix('\u{feff}').unwrap_or(text).to_owned(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Whether a declared upload content type can hold plain-text codes.
pub fn is_text_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|mime| mime.to_ascii_lowercase().starts_with("text/"))
}

/// Filename from a `Content-Disposition` header (`attachment; filename="codes.txt"`).
pub fn disposition_filename(disposition: &str) -> Option<&str> {
    disposition.split(';').map(str::trim).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then(|| value.trim().trim_matches('"'))
            .filter(|name| !name.is_empty())
    })
}

/// Whether an upload may be read as text: a `.txt` filename whatever the declared type
/// (chat bridges often label text files `application/octet-stream`), else a `text/*`
/// content type. An upload that declares no content type is treated as text.
pub fn is_text_upload(content_type: Option<&str>, filename: Option<&str>) -> bool {
    if filename.is_some_and(|name| name.to_ascii_lowercase().ends_with(".txt")) {
        return true;
    }
    content_type.is_none_or(is_text_content_type)
}
