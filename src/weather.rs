//! Weather generation and weather -> gameplay modifier computation (spec §4.1).
//!
//! `effects()`'s concrete magnitudes are an implementation decision: the
//! directionality (cold/wind/precipitation degrade or boost which modifiers)
//! is pinned by spec.md §4.1, but the exact factors were not recoverable
//! from source (see DESIGN.md). They are fixed here and exercised by tests
//! so they stay stable across runs.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::rng::Lcg32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    LightRain,
    HeavyRain,
    LightSnow,
    HeavySnow,
    Fog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindDirection {
    Calm,
    Crosswind,
    Headwind,
    Tailwind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub condition: WeatherCondition,
    pub temperature: i32,
    pub wind_speed: i32,
    pub wind_direction: WindDirection,
    pub precipitation_intensity: f64,
}

/// Eight multiplicative modifiers in (0, inf). Identity is 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherEffects {
    pub passing_accuracy: f64,
    pub passing_distance: f64,
    pub kicking_accuracy: f64,
    pub kicking_distance: f64,
    pub rushing_yards: f64,
    pub fumble_chance: f64,
    pub visibility: f64,
    pub field_condition: f64,
}

impl Default for WeatherEffects {
    fn default() -> Self {
        Self {
            passing_accuracy: 1.0,
            passing_distance: 1.0,
            kicking_accuracy: 1.0,
            kicking_distance: 1.0,
            rushing_yards: 1.0,
            fumble_chance: 1.0,
            visibility: 1.0,
            field_condition: 1.0,
        }
    }
}

/// Condition sampled by the fixed probability table in spec.md §4.1.
fn sample_condition(rng: &mut Lcg32) -> WeatherCondition {
    let roll = rng.next_f64();
    let table: [(f64, WeatherCondition); 7] = [
        (0.35, WeatherCondition::Clear),
        (0.25, WeatherCondition::Cloudy),
        (0.15, WeatherCondition::LightRain),
        (0.08, WeatherCondition::HeavyRain),
        (0.10, WeatherCondition::LightSnow),
        (0.04, WeatherCondition::HeavySnow),
        (0.03, WeatherCondition::Fog),
    ];
    let mut cumulative = 0.0;
    for (p, condition) in table {
        cumulative += p;
        if roll < cumulative {
            return condition;
        }
    }
    WeatherCondition::Clear
}

fn temperature_range(condition: WeatherCondition) -> (i32, i32) {
    match condition {
        WeatherCondition::LightSnow | WeatherCondition::HeavySnow => (15, 35),
        WeatherCondition::LightRain | WeatherCondition::HeavyRain => (35, 75),
        WeatherCondition::Clear | WeatherCondition::Cloudy | WeatherCondition::Fog => (25, 85),
    }
}

fn precipitation_intensity(condition: WeatherCondition, rng: &mut Lcg32) -> f64 {
    match condition {
        WeatherCondition::LightRain | WeatherCondition::LightSnow => 0.2 + rng.next_f64() * 0.3,
        WeatherCondition::HeavyRain | WeatherCondition::HeavySnow => 0.6 + rng.next_f64() * 0.4,
        WeatherCondition::Clear | WeatherCondition::Cloudy | WeatherCondition::Fog => 0.0,
    }
}

/// Samples a `Weather` from the side PRNG (conventionally seeded `seed +
/// 1000`, per spec.md §9 — callers own that offset, this function just
/// consumes whatever generator it's given).
pub fn generate_weather(rng: &mut Lcg32) -> Weather {
    let condition = sample_condition(rng);

    let (low, high) = temperature_range(condition);
    let temperature = low + (rng.next_f64() * f64::from(high - low + 1)).floor() as i32;
    let temperature = temperature.min(high);

    let normal = Normal::new(8.0, 6.0).expect("valid normal params");
    let wind_speed = normal.sample(rng).clamp(0.0, 45.0).round() as i32;

    let wind_direction = if wind_speed <= 5 {
        WindDirection::Calm
    } else {
        match rng.gen_range(0..3) {
            0 => WindDirection::Crosswind,
            1 => WindDirection::Headwind,
            _ => WindDirection::Tailwind,
        }
    };

    let precipitation_intensity = precipitation_intensity(condition, rng);

    Weather {
        condition,
        temperature,
        wind_speed,
        wind_direction,
        precipitation_intensity,
    }
}

/// Composes the multiplicative modifiers for a given `Weather`, in the
/// order spec.md §4.1 describes: temperature band, then wind, then
/// precipitation.
pub fn effects(weather: &Weather) -> WeatherEffects {
    let mut e = WeatherEffects::default();

    if weather.temperature <= 20 {
        e.passing_accuracy *= 0.85;
        e.kicking_accuracy *= 0.85;
        e.fumble_chance *= 1.25;
    } else if weather.temperature <= 35 {
        e.passing_accuracy *= 0.93;
        e.kicking_accuracy *= 0.92;
        e.fumble_chance *= 1.12;
    } else if weather.temperature >= 85 {
        e.rushing_yards *= 0.97;
    }

    let wind_scale = (f64::from(weather.wind_speed) / 30.0).min(1.0);
    match weather.wind_direction {
        WindDirection::Calm => {}
        WindDirection::Crosswind => {
            e.passing_accuracy *= 1.0 - 0.15 * wind_scale;
            e.kicking_accuracy *= 1.0 - 0.20 * wind_scale;
        }
        WindDirection::Headwind => {
            e.passing_distance *= 1.0 - 0.20 * wind_scale;
            e.kicking_distance *= 1.0 - 0.25 * wind_scale;
        }
        WindDirection::Tailwind => {
            e.passing_distance *= 1.0 + 0.15 * wind_scale;
            e.kicking_distance *= 1.0 + 0.20 * wind_scale;
        }
    }

    let intensity = weather.precipitation_intensity;
    match weather.condition {
        WeatherCondition::LightRain | WeatherCondition::HeavyRain => {
            e.passing_accuracy *= 1.0 - 0.10 * intensity;
            e.kicking_accuracy *= 1.0 - 0.08 * intensity;
            e.fumble_chance *= 1.0 + 0.20 * intensity;
        }
        WeatherCondition::LightSnow | WeatherCondition::HeavySnow => {
            e.passing_accuracy *= 1.0 - 0.10 * intensity;
            e.kicking_accuracy *= 1.0 - 0.08 * intensity;
            e.fumble_chance *= 1.0 + 0.20 * intensity;
            e.visibility *= 1.0 - 0.15 * intensity;
            e.field_condition *= 1.0 - 0.20 * intensity;
        }
        WeatherCondition::Fog => {
            e.visibility *= 0.65;
            e.passing_accuracy *= 0.90;
            e.kicking_accuracy *= 0.92;
        }
        WeatherCondition::Clear | WeatherCondition::Cloudy => {}
    }

    e
}

impl Weather {
    pub fn clear_default() -> Self {
        Self {
            condition: WeatherCondition::Clear,
            temperature: 65,
            wind_speed: 4,
            wind_direction: WindDirection::Calm,
            precipitation_intensity: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calm_iff_low_wind_speed() {
        let mut rng = Lcg32::new(11);
        for _ in 0..2_000 {
            let w = generate_weather(&mut rng);
            assert_eq!(w.wind_direction == WindDirection::Calm, w.wind_speed <= 5);
        }
    }

    #[test]
    fn determinism() {
        let mut a = Lcg32::new(99);
        let mut b = Lcg32::new(99);
        assert_eq!(generate_weather(&mut a), generate_weather(&mut b));
    }

    #[test]
    fn effects_are_identity_for_calm_clear_weather() {
        let w = Weather {
            condition: WeatherCondition::Clear,
            temperature: 65,
            wind_speed: 0,
            wind_direction: WindDirection::Calm,
            precipitation_intensity: 0.0,
        };
        assert_eq!(effects(&w), WeatherEffects::default());
    }

    #[test]
    fn heavy_snow_degrades_visibility_and_field_condition() {
        let w = Weather {
            condition: WeatherCondition::HeavySnow,
            temperature: 20,
            wind_speed: 10,
            wind_direction: WindDirection::Crosswind,
            precipitation_intensity: 0.9,
        };
        let fx = effects(&w);
        assert!(fx.visibility < 1.0);
        assert!(fx.field_condition < 1.0);
        assert!(fx.passing_accuracy < 1.0);
    }
}
