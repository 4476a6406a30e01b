//! Baseline clothing recommendations from per-category threshold ladders
//!
//! Every essential category (base layer, bottoms, footwear) gets exactly one
//! entry; mid layer, outer layer and accessories only appear when a ladder
//! calls for them.

use crate::models::{Category, Recommendation, WeatherReading};

/// Below this feels-like temperature dress for deep cold (°F)
const DEEP_COLD_F: f64 = 25.0;
/// Below this accessories for the cold are added (°F)
const FREEZING_F: f64 = 32.0;
const WINTER_COAT_F: f64 = 40.0;
const SWEATER_F: f64 = 50.0;
const LIGHT_JACKET_F: f64 = 55.0;
const LONG_PANTS_F: f64 = 65.0;
/// At or above this sun protection is added on fair days (°F)
const SUN_PROTECTION_F: f64 = 80.0;
/// Wind above which an umbrella is traded for a rain jacket (mph)
const BREEZY_MPH: f64 = 10.0;

fn base_layer(feels_like: f64) -> Recommendation {
    if feels_like < DEEP_COLD_F {
        Recommendation::new(Category::BaseLayer, "🧊", "Thermal underwear or heat tech")
    } else if feels_like < SWEATER_F {
        Recommendation::new(Category::BaseLayer, "👕", "Long sleeve shirt")
    } else {
        Recommendation::new(Category::BaseLayer, "👕", "T-shirt or short sleeves")
    }
}

fn bottoms(feels_like: f64) -> Recommendation {
    if feels_like < DEEP_COLD_F {
        Recommendation::new(Category::Bottoms, "👖", "Heavy pants with thermal layer")
    } else if feels_like < LONG_PANTS_F {
        Recommendation::new(Category::Bottoms, "👖", "Long pants")
    } else {
        Recommendation::new(Category::Bottoms, "🩳", "Shorts or light pants")
    }
}

fn mid_layer(reading: &WeatherReading) -> Option<Recommendation> {
    if reading.feels_like < SWEATER_F {
        Some(Recommendation::new(Category::MidLayer, "🧶", "Sweater or fleece"))
    } else if reading.feels_like < LONG_PANTS_F && reading.wind_speed > BREEZY_MPH {
        Some(Recommendation::new(
            Category::MidLayer,
            "🌬️",
            "Light sweatshirt for the breeze",
        ))
    } else {
        None
    }
}

fn outer_layers(reading: &WeatherReading) -> Vec<Recommendation> {
    let mut layers = Vec::new();
    let feels_like = reading.feels_like;

    if feels_like < DEEP_COLD_F {
        layers.push(Recommendation::new(Category::OuterLayer, "🧥", "Heavy winter coat"));
    } else if feels_like < WINTER_COAT_F {
        layers.push(Recommendation::new(Category::OuterLayer, "🧥", "Winter coat"));
    } else if feels_like < LIGHT_JACKET_F {
        layers.push(Recommendation::new(Category::OuterLayer, "🧥", "Light jacket"));
    }

    if reading.is_wet() && reading.wind_speed > BREEZY_MPH {
        layers.push(Recommendation::new(
            Category::OuterLayer,
            "🧥",
            "Rain jacket (too windy for an umbrella)",
        ));
    }

    layers
}

fn accessories(reading: &WeatherReading) -> Vec<Recommendation> {
    let mut items = Vec::new();

    if reading.feels_like < FREEZING_F {
        items.push(Recommendation::new(Category::Accessories, "🧣", "Scarf"));
        items.push(Recommendation::new(Category::Accessories, "🧤", "Gloves"));
        items.push(Recommendation::new(Category::Accessories, "🧢", "Warm hat"));
    }

    if reading.is_wet() && reading.wind_speed <= BREEZY_MPH {
        items.push(Recommendation::new(Category::Accessories, "☔", "Umbrella"));
    }

    if reading.is_fair() && reading.feels_like >= SUN_PROTECTION_F {
        items.push(Recommendation::new(
            Category::Accessories,
            "🕶️",
            "Sunglasses and a sun hat",
        ));
    }

    items
}

fn footwear(reading: &WeatherReading) -> Recommendation {
    if reading.is_wet() {
        Recommendation::new(Category::Footwear, "👢", "Waterproof rain boots")
    } else if reading.is_frozen() {
        Recommendation::new(Category::Footwear, "🥾", "Waterproof insulated boots")
    } else {
        Recommendation::new(Category::Footwear, "👟", "Regular shoes or sneakers")
    }
}

/// Standard recommendations for a reading, in category order
#[must_use]
pub fn standard_recommendations(reading: &WeatherReading) -> Vec<Recommendation> {
    let mut items = vec![base_layer(reading.feels_like), bottoms(reading.feels_like)];
    items.extend(mid_layer(reading));
    items.extend(outer_layers(reading));
    items.extend(accessories(reading));
    items.push(footwear(reading));
    items
}
