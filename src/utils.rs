//! Small shared helpers: phone formatting, avatar initials, MIME lookup.

/// Formats raw phone input into the "(XXX) XXX-XXXX" display mask.
///
/// Non-digit characters are stripped and the digit sequence is capped at
/// ten, so re-formatting an already-masked value is a no-op and typing past
/// a complete number changes nothing.
pub fn format_phone_number(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).take(10).collect();

    match digits.len() {
        0 => String::new(),
        1..=3 => digits,
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

/// Derives up to two uppercase initials from a doctor's name.
///
/// Takes the first letter of each of the first two whitespace-separated
/// tokens; falls back to "DR" when the name is empty.
pub fn avatar_initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|token| token.chars().next())
        .flat_map(|c| c.to_uppercase())
        .collect();

    if initials.is_empty() {
        String::from("DR")
    } else {
        initials
    }
}

/// Guesses an image MIME type from a file extension.
///
/// Returns `None` for anything that is not a recognized image extension;
/// the avatar field rejects those files without reading them.
pub fn guess_image_mime(path: &str) -> Option<&'static str> {
    let extension = path.rsplit('.').next()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_mask_builds_progressively() {
        assert_eq!(format_phone_number(""), "");
        assert_eq!(format_phone_number("5"), "5");
        assert_eq!(format_phone_number("555"), "555");
        assert_eq!(format_phone_number("5551"), "(555) 1");
        assert_eq!(format_phone_number("555123"), "(555) 123");
        assert_eq!(format_phone_number("5551234"), "(555) 123-4");
        assert_eq!(format_phone_number("5551234567"), "(555) 123-4567");
    }

    #[test]
    fn phone_mask_preserves_digits_and_caps_at_ten() {
        let masked = format_phone_number("(555) 123-4567 ext 89");
        assert_eq!(masked, "(555) 123-4567");

        let digits: String = masked.chars().filter(|c| c.is_ascii_digit()).collect();
        assert_eq!(digits, "5551234567");
    }

    #[test]
    fn phone_mask_is_idempotent() {
        let once = format_phone_number("5551234567");
        assert_eq!(format_phone_number(&once), once);
    }

    #[test]
    fn initials_use_first_two_tokens() {
        assert_eq!(avatar_initials("Jane Roe"), "JR");
        assert_eq!(avatar_initials("Dr. Jane Roe"), "DJ");
        assert_eq!(avatar_initials("  jane   "), "J");
        assert_eq!(avatar_initials(""), "DR");
    }

    #[test]
    fn mime_lookup_recognizes_images_only() {
        assert_eq!(guess_image_mime("scan.PNG"), Some("image/png"));
        assert_eq!(guess_image_mime("/tmp/photo.jpeg"), Some("image/jpeg"));
        assert_eq!(guess_image_mime("notes.pdf"), None);
        assert_eq!(guess_image_mime("no_extension"), None);
    }
}
