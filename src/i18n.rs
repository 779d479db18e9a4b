//! Internationalization (i18n) module
//!
//! Picks the language for console text. Supports English and Indonesian.
//! Note: Log messages remain in English for consistency.

use tracing::debug;

/// Locales with a translation file
pub const SUPPORTED_LOCALES: &[&str] = &["en", "id"];

const FALLBACK_LOCALE: &str = "en";

/// Map a locale tag like `id-ID`, `en_US.UTF-8` or `in` to a supported locale
fn normalize(tag: &str) -> Option<&'static str> {
    let lang = tag
        .split(['-', '_', '.'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        // older JVM/Android tag for Indonesian
        "id" | "in" => Some("id"),
        "en" => Some("en"),
        _ => None,
    }
}

/// Requested locale if supported, else the system one, else English
pub fn pick_locale(requested: Option<&str>, system: Option<&str>) -> &'static str {
    requested
        .and_then(normalize)
        .or_else(|| system.and_then(normalize))
        .unwrap_or(FALLBACK_LOCALE)
}

/// Set the console language for the rest of the process
pub fn init_locale(requested: Option<&str>) -> &'static str {
    let system = sys_locale::get_locale();
    let locale = pick_locale(requested, system.as_deref());
    debug!(?requested, ?system, locale, "Selected locale");
    rust_i18n::set_locale(locale);
    locale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("id-ID"), Some("id"));
        assert_eq!(normalize("in_ID"), Some("id"));
        assert_eq!(normalize("en_US.UTF-8"), Some("en"));
        assert_eq!(normalize("EN"), Some("en"));
        assert_eq!(normalize("zh-CN"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn test_pick_locale_precedence() {
        assert_eq!(pick_locale(Some("id"), Some("en-US")), "id");
        assert_eq!(pick_locale(Some("fr"), Some("id-ID")), "id");
        assert_eq!(pick_locale(None, Some("id-ID")), "id");
        assert_eq!(pick_locale(None, Some("de-DE")), "en");
        assert_eq!(pick_locale(None, None), "en");
    }

    #[test]
    fn test_every_supported_locale_normalizes_to_itself() {
        for locale in SUPPORTED_LOCALES {
            assert_eq!(normalize(locale), Some(*locale));
        }
    }
}
