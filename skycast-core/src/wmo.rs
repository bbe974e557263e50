//! WMO weather-code catalog.
//!
//! Total lookup from an integer weather code to a display glyph and a short
//! description. Codes outside the documented set fall back to a generic entry,
//! so the lookup never fails.

/// A display glyph plus human-readable description for one weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry {
    pub glyph: &'static str,
    pub description: &'static str,
}

/// Entry returned for any code the catalog does not document.
pub const FALLBACK: CodeEntry = CodeEntry {
    glyph: "🌍",
    description: "Unknown Weather Pattern",
};

const fn entry(glyph: &'static str, description: &'static str) -> CodeEntry {
    CodeEntry { glyph, description }
}

/// Map a WMO weather code to its glyph and description.
pub fn lookup(code: i32) -> CodeEntry {
    match code {
        0 => entry("☀️", "Clear Sky"),
        1 => entry("🌤️", "Mainly Clear"),
        2 => entry("⛅", "Partly Cloudy"),
        3 => entry("☁️", "Overcast"),
        45 => entry("🌫️", "Fog"),
        48 => entry("🌫️", "Depositing Rime Fog"),
        51 => entry("🌧️", "Light Drizzle"),
        53 => entry("🌧️", "Moderate Drizzle"),
        55 => entry("🌧️", "Dense Drizzle"),
        61 => entry("☔", "Slight Rain"),
        63 => entry("☔", "Moderate Rain"),
        65 => entry("☔", "Heavy Rain"),
        71 => entry("❄️", "Slight Snow Fall"),
        73 => entry("❄️", "Moderate Snow Fall"),
        75 => entry("❄️", "Heavy Snow Fall"),
        95 => entry("⛈️", "Thunderstorm"),
        96 => entry("⛈️", "Thunderstorm with slight hail"),
        99 => entry("⛈️", "Thunderstorm with heavy hail"),
        _ => FALLBACK,
    }
}
