//! Safety warnings derived from fixed thresholds
//!
//! Temperature and wind bands are mutually exclusive: only the most severe
//! band that applies produces a warning.

use crate::models::WeatherReading;

/// Feels-like below this is dangerous cold (°F)
pub const DANGEROUS_COLD_F: f64 = 5.0;
/// Feels-like below this risks hypothermia (°F)
pub const HYPOTHERMIA_F: f64 = 20.0;
/// Feels-like above this risks heat exhaustion (°F)
pub const HEAT_EXHAUSTION_F: f64 = 95.0;
/// Feels-like above this is dangerous heat (°F)
pub const DANGEROUS_HEAT_F: f64 = 105.0;
/// Gap between actual and apparent temperature that warrants layers (°F)
pub const LAYERING_GAP_F: f64 = 10.0;
/// Wind above this calls for a windbreaker (mph)
pub const MODERATE_WIND_MPH: f64 = 20.0;
/// Wind above this is strong (mph)
pub const STRONG_WIND_MPH: f64 = 30.0;
/// Fair-weather temperature above which sunscreen is suggested (°F)
pub const SUNSCREEN_F: f64 = 75.0;

pub const DANGEROUS_COLD: &str =
    "🚫 Dangerous cold! Frostbite and hypothermia can set in fast. Limit time outdoors.";
pub const HYPOTHERMIA: &str = "⚠️ Risk of hypothermia with prolonged exposure! Dress warmly.";
pub const DANGEROUS_HEAT: &str =
    "🚫 Dangerous heat! Limit outdoor activities to early morning or evening.";
pub const HEAT_EXHAUSTION: &str = "⚠️ Heat exhaustion risk! Stay hydrated and seek shade.";
pub const LAYERS: &str =
    "⚠️ Temperature feels different than actual! Consider dressing in layers.";
pub const STRONG_WIND: &str = "🌪️ Strong winds! Be careful outdoors.";
pub const MODERATE_WIND: &str = "💨 Moderate winds! Consider a windbreaker.";
pub const SUNSCREEN: &str = "☀️ Don't forget sunscreen and sunglasses!";

/// Warning for a condition label, if that condition carries one
fn condition_warning(conditions: &str) -> Option<&'static str> {
    match conditions {
        "thunderstorm" => Some("⚡ Thunderstorm! Seek shelter if outdoors."),
        "tornado" => Some("🌪️ Tornado warning! Seek appropriate shelter immediately."),
        "snow" | "sleet" => Some("❄️ Slippery conditions! Watch your step."),
        "rain" | "drizzle" => Some("☔ Slick surfaces! Walk carefully."),
        "fog" => Some("🌫️ Limited visibility! Be extra cautious."),
        _ => None,
    }
}

/// Safety warnings for a reading. Never fails; an empty list means nothing to flag.
#[must_use]
pub fn safety_warnings(reading: &WeatherReading) -> Vec<String> {
    let mut warnings = Vec::new();
    let feels_like = reading.feels_like;

    if feels_like < DANGEROUS_COLD_F {
        warnings.push(DANGEROUS_COLD);
    } else if feels_like < HYPOTHERMIA_F {
        warnings.push(HYPOTHERMIA);
    } else if feels_like > DANGEROUS_HEAT_F {
        warnings.push(DANGEROUS_HEAT);
    } else if feels_like > HEAT_EXHAUSTION_F {
        warnings.push(HEAT_EXHAUSTION);
    }

    if reading.feels_like_gap() > LAYERING_GAP_F {
        warnings.push(LAYERS);
    }

    if reading.wind_speed > STRONG_WIND_MPH {
        warnings.push(STRONG_WIND);
    } else if reading.wind_speed > MODERATE_WIND_MPH {
        warnings.push(MODERATE_WIND);
    }

    if let Some(warning) = condition_warning(&reading.conditions) {
        warnings.push(warning);
    }

    if reading.is_fair() && reading.temperature > SUNSCREEN_F {
        warnings.push(SUNSCREEN);
    }

    warnings.into_iter().map(String::from).collect()
}
