// Copyright (c) 2026 rezky_nightky

/// Half-width katakana plus digits and a few symbols, the classic rain set.
pub const MATRIX_GLYPHS: [char; 54] = [
    'ﾊ', 'ﾐ', 'ﾋ', 'ｰ', 'ｳ', 'ｼ', 'ﾅ', 'ﾓ', 'ﾆ', 'ｻ', 'ﾜ', 'ﾂ', 'ｵ', 'ﾘ', 'ｱ', 'ﾎ', 'ﾃ', 'ﾏ',
    'ｹ', 'ﾒ', 'ｴ', 'ｶ', 'ｷ', 'ﾑ', 'ﾕ', 'ﾗ', 'ｾ', 'ﾈ', 'ｽ', 'ﾀ', 'ﾇ', 'ﾍ', '0', '1', '2', '3',
    '4', '5', '6', '7', '8', '9', 'Y', 'Z', ':', '.', '=', '*', '+', '-', '<', '>', '¦', '|',
];

/// Safe subset for terminals whose locale cannot render katakana.
pub const ASCII_GLYPHS: [char; 21] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'Y', 'Z', ':', '.', '=', '*', '+', '-',
    '<', '>', '|',
];

pub fn default_to_ascii() -> bool {
    let lang = std::env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

pub fn charset_from_str(spec: &str, ascii_fallback: bool) -> Result<Vec<char>, String> {
    match spec.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(if ascii_fallback {
            ASCII_GLYPHS.to_vec()
        } else {
            MATRIX_GLYPHS.to_vec()
        }),
        "matrix" => Ok(MATRIX_GLYPHS.to_vec()),
        "ascii" => Ok(ASCII_GLYPHS.to_vec()),
        _ => Err(format!(
            "unsupported charset: {} (allowed: auto, matrix, ascii)",
            spec
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_respects_locale_fallback() {
        assert_eq!(charset_from_str("auto", true).unwrap(), ASCII_GLYPHS);
        assert_eq!(charset_from_str("auto", false).unwrap(), MATRIX_GLYPHS);
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(charset_from_str("klingon", false).is_err());
    }
}
