//! User-agent classification by ordered substring tables.
//!
//! Patterns are checked top to bottom and the first case-sensitive substring hit wins.
//! Order matters: Chromium user agents also contain "Safari", and iPad agents may also
//! contain "Mobile".

use activity_types::DeviceType;

/// Device rules, evaluated in order. No hit means desktop.
pub const DEVICE_RULES: &[(&str, DeviceType)] = &[
    ("iPad", DeviceType::Tablet),
    ("Mobile", DeviceType::Mobile),
    ("Android", DeviceType::Mobile),
    ("iPhone", DeviceType::Mobile),
];

/// Browser rules, evaluated in order. No hit means [`UNKNOWN_BROWSER`].
pub const BROWSER_RULES: &[(&str, &str)] = &[
    ("Chrome", "Chrome"),
    ("Firefox", "Firefox"),
    ("Safari", "Safari"),
];

pub const UNKNOWN_BROWSER: &str = "Unknown";

fn first_match<'a, T: Copy>(user_agent: &str, rules: &'a [(&'a str, T)]) -> Option<T> {
    rules
        .iter()
        .find(|(pattern, _)| user_agent.contains(pattern))
        .map(|(_, label)| *label)
}

pub fn device_type(user_agent: &str) -> DeviceType {
    first_match(user_agent, DEVICE_RULES).unwrap_or(DeviceType::Desktop)
}

pub fn browser_name(user_agent: &str) -> &'static str {
    first_match(user_agent, BROWSER_RULES).unwrap_or(UNKNOWN_BROWSER)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const FIREFOX_ANDROID: &str = "Mozilla/5.0 (Android 14; Mobile; rv:121.0) Gecko/121.0 Firefox/121.0";

    #[test]
    fn chromium_is_chrome_even_though_it_mentions_safari() {
        assert_eq!(browser_name(CHROME_DESKTOP), "Chrome");
        assert_eq!(device_type(CHROME_DESKTOP), DeviceType::Desktop);
    }

    #[test]
    fn ipad_is_tablet_not_mobile() {
        assert_eq!(device_type(SAFARI_IPAD), DeviceType::Tablet);
        assert_eq!(browser_name(SAFARI_IPAD), "Safari");
    }

    #[test]
    fn android_phone_is_mobile() {
        assert_eq!(device_type(FIREFOX_ANDROID), DeviceType::Mobile);
        assert_eq!(browser_name(FIREFOX_ANDROID), "Firefox");
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(device_type("some ipad client"), DeviceType::Desktop);
        assert_eq!(browser_name("chrome-lowercase"), UNKNOWN_BROWSER);
        assert_eq!(browser_name(""), UNKNOWN_BROWSER);
    }
}
