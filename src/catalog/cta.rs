//! # Click-to-Contact Links
//!
//! Builds `https://wa.me/<digits>?text=<message>` links. The message is
//! percent-encoded as UTF-8, so Arabic titles survive the round trip intact.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::item::{ItemKind, MarketingItem};

const WHATSAPP_BASE: &str = "https://wa.me/";

/// Closing line of every message
pub const BRAND_SUFFIX: &str = "📲 أرسل لنا لحجز الموعد";

/// Everything but RFC 3986 unreserved characters
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Compose the pre-filled chat message
pub fn compose_message(title: &str, code: Option<&str>, kind: ItemKind) -> String {
    let mut lines = vec![format!("📋 {}: {}", kind.label(), title.trim())];
    if let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) {
        lines.push(format!("🔖 Code: {}", code));
    }
    lines.push(BRAND_SUFFIX.to_string());
    lines.join("\n")
}

/// Build the contact link; `None` when there is no usable phone number
pub fn build(phone: Option<&str>, title: &str, code: Option<&str>, kind: ItemKind) -> Option<String> {
    let digits: String = phone?.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let message = compose_message(title, code, kind);
    Some(format!(
        "{}{}?text={}",
        WHATSAPP_BASE,
        digits,
        utf8_percent_encode(&message, QUERY_VALUE)
    ))
}

/// The link an item should carry: its override if set, else a built link
pub fn link_for(item: &MarketingItem) -> Option<String> {
    if let Some(link) = item.cta_override.as_deref().map(str::trim) {
        if !link.is_empty() {
            return Some(link.to_string());
        }
    }
    build(
        item.contact_phone.as_deref(),
        &item.title,
        Some(item.code.as_str()),
        item.kind,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;

    fn decoded_text(link: &str) -> String {
        let (_, encoded) = link.split_once("?text=").unwrap();
        percent_decode_str(encoded).decode_utf8().unwrap().into_owned()
    }

    #[test]
    fn test_absent_phone_yields_no_link() {
        assert_eq!(build(None, "Offer", Some("X-1"), ItemKind::Brochure), None);
        assert_eq!(build(Some("  "), "Offer", Some("X-1"), ItemKind::Brochure), None);
        assert_eq!(build(Some("n/a"), "Offer", None, ItemKind::Service), None);
    }

    #[test]
    fn test_arabic_message_round_trips() {
        let link = build(Some("96512345678"), "عرض خاص", Some("X-1"), ItemKind::Brochure).unwrap();

        assert!(link.starts_with("https://wa.me/96512345678?text="));
        assert!(link.is_ascii());
        assert_eq!(
            decoded_text(&link),
            compose_message("عرض خاص", Some("X-1"), ItemKind::Brochure)
        );
        assert_eq!(
            decoded_text(&link),
            "📋 Brochure: عرض خاص\n🔖 Code: X-1\n📲 أرسل لنا لحجز الموعد"
        );
    }

    #[test]
    fn test_newlines_and_spaces_are_encoded() {
        let link = build(Some("96512345678"), "Skin Care", None, ItemKind::Service).unwrap();
        let (_, encoded) = link.split_once("?text=").unwrap();
        assert!(encoded.contains("%0A"));
        assert!(encoded.contains("%20"));
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains("Code"));
    }

    #[test]
    fn test_phone_reduced_to_digits() {
        let link = build(Some("+965 1234-5678"), "Offer", None, ItemKind::Brochure).unwrap();
        assert!(link.starts_with("https://wa.me/96512345678?"));
    }
}
