//! WMO weather code translation

/// Convert an Open-Meteo weather code to a human-readable description
#[must_use]
pub fn describe(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Rime fog",
        51 => "Light drizzle",
        53 => "Drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Light snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Rain showers",
        81 => "Heavy showers",
        82 => "Violent showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm (hail)",
        99 => "Thunderstorm (heavy hail)",
        _ => "Unknown",
    }
}

/// Icon asset name for a code; the asset is expected next to the output, unvalidated
#[must_use]
pub fn icon_file(code: u16) -> String {
    format!("{code}.png")
}
