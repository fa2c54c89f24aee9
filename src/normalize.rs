//! Field normalization for backend payloads.
//!
//! The API serves two naming conventions for the same fields (a Spanish
//! primary and an English alternate). Every normalized field is declared as
//! an ordered list of candidate keys evaluated in priority order, falling
//! back to a literal default so the dashboard never renders NaN.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::reading::{PumpReading, Source, WeatherReading};

pub const DEFAULT_PRESSURE_HPA: f64 = 1013.0;

const KMH_PER_MS: f64 = 3.6;

/// Unwraps the `{success, data}` envelope some endpoints use. A bare object
/// is returned as-is.
pub fn unwrap_envelope(payload: &Value) -> &Value {
    match payload.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => payload,
    }
}

/// Returns the first candidate key present with a usable numeric value,
/// else the default. Numeric strings are accepted; NaN and infinities are
/// rejected so the default is the only non-finite outcome.
pub fn pick_number(obj: &Value, keys: &[&str], default: f64) -> f64 {
    for key in keys {
        match obj.get(key) {
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_f64() {
                    if v.is_finite() {
                        return v;
                    }
                }
            }
            Some(Value::String(s)) => {
                if let Ok(v) = s.trim().parse::<f64>() {
                    if v.is_finite() {
                        return v;
                    }
                }
            }
            _ => {}
        }
    }
    default
}

fn pick_timestamp(obj: &Value, keys: &[&str]) -> DateTime<Utc> {
    for key in keys {
        if let Some(Value::String(s)) = obj.get(key) {
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return ts.with_timezone(&Utc);
            }
        }
    }
    Utc::now()
}

/// Normalizes a weather payload. Returns `None` when the payload carries no
/// recognizable weather data at all, which callers treat the same as a
/// failed fetch.
pub fn normalize_weather(payload: &Value) -> Option<WeatherReading> {
    let obj = unwrap_envelope(payload);

    let has_data = obj.get("temperatura_c").is_some() || obj.get("humedad_porcentaje").is_some();
    if !has_data {
        return None;
    }

    let wind_ms = pick_number(obj, &["velocidad_viento_ms"], 0.0);
    let wind_kmh = pick_number(
        obj,
        &["velocidad_viento_kmh", "wind_speed_kmh"],
        wind_ms * KMH_PER_MS,
    );

    Some(WeatherReading {
        temperature_c: pick_number(obj, &["temperatura_c", "temperature_c"], 0.0),
        humidity_percent: pick_number(obj, &["humedad_porcentaje", "humidity_percent"], 0.0),
        precipitation_mm: pick_number(obj, &["precipitacion_mm", "precipitation_mm"], 0.0),
        pressure_hpa: pick_number(
            obj,
            &["presion_hpa", "presion_atmosferica_hpa", "pressure_hpa"],
            DEFAULT_PRESSURE_HPA,
        ),
        wind_speed_kmh: wind_kmh,
        wind_direction_deg: pick_number(obj, &["direccion_viento_grados", "wind_direction_deg"], 0.0),
        solar_radiation_wm2: pick_number(obj, &["radiacion_solar_wm2", "solar_radiation_wm2"], 0.0),
        timestamp: pick_timestamp(obj, &["fecha_hora", "timestamp"]),
        source: Source::Live,
    })
}

/// Normalizes a pump status payload. Returns `None` when the payload has no
/// running-state indication.
pub fn normalize_pump(payload: &Value) -> Option<PumpReading> {
    let obj = unwrap_envelope(payload);

    let running = match (obj.get("is_running"), obj.get("estado")) {
        (Some(Value::Bool(b)), _) => *b,
        (_, Some(Value::String(s))) => s == "ENCENDIDA",
        _ => return None,
    };

    Some(PumpReading {
        running,
        flow_m3h: pick_number(obj, &["caudal_m3h", "flow_rate_m3h"], 0.0),
        inlet_pressure_bar: pick_number(obj, &["presion_entrada_bar", "inlet_pressure_bar"], 0.0),
        outlet_pressure_bar: pick_number(obj, &["presion_salida_bar", "outlet_pressure_bar"], 0.0),
        motor_temperature_c: pick_number(obj, &["temperatura_motor_c", "motor_temperature_c"], 0.0),
        power_kw: pick_number(obj, &["consumo_energia_kw", "power_consumption_kwh"], 0.0),
        running_hours: pick_number(obj, &["horas_operacion", "running_hours"], 0.0),
        timestamp: pick_timestamp(obj, &["fecha_hora", "timestamp"]),
        source: Source::Live,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn picks_primary_key_first() {
        let obj = json!({ "temperatura_c": 25.5, "temperature_c": 99.0 });
        assert_eq!(pick_number(&obj, &["temperatura_c", "temperature_c"], 0.0), 25.5);
    }

    #[test]
    fn falls_back_to_alternate_key() {
        let obj = json!({ "temperature_c": 21.0 });
        assert_eq!(pick_number(&obj, &["temperatura_c", "temperature_c"], 0.0), 21.0);
    }

    #[test]
    fn missing_field_yields_default_never_nan() {
        let obj = json!({});
        let v = pick_number(&obj, &["presion_hpa", "pressure_hpa"], DEFAULT_PRESSURE_HPA);
        assert_eq!(v, DEFAULT_PRESSURE_HPA);
        assert!(v.is_finite());

        let junk = json!({ "presion_hpa": "not a number" });
        let v = pick_number(&junk, &["presion_hpa"], DEFAULT_PRESSURE_HPA);
        assert_eq!(v, DEFAULT_PRESSURE_HPA);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let obj = json!({ "humedad_porcentaje": "72.5" });
        assert_eq!(pick_number(&obj, &["humedad_porcentaje"], 0.0), 72.5);
    }

    #[test]
    fn unwraps_success_data_envelope() {
        let enveloped = json!({ "success": true, "data": { "temperatura_c": 30.2 } });
        let reading = normalize_weather(&enveloped).unwrap();
        assert_eq!(reading.temperature_c, 30.2);
        assert_eq!(reading.source, Source::Live);

        let bare = json!({ "temperatura_c": 19.0 });
        assert_eq!(normalize_weather(&bare).unwrap().temperature_c, 19.0);
    }

    #[test]
    fn weather_without_recognizable_fields_is_rejected() {
        let obj = json!({ "success": true, "data": { "unrelated": 1 } });
        assert!(normalize_weather(&obj).is_none());
    }

    #[test]
    fn wind_kmh_derived_from_ms_when_absent() {
        let obj = json!({ "temperatura_c": 24.0, "velocidad_viento_ms": 5.0 });
        let reading = normalize_weather(&obj).unwrap();
        assert!((reading.wind_speed_kmh - 18.0).abs() < 1e-9);
    }

    #[test]
    fn pump_running_from_estado_string() {
        let obj = json!({ "estado": "ENCENDIDA", "caudal_m3h": 3.2 });
        let reading = normalize_pump(&obj).unwrap();
        assert!(reading.running);
        assert_eq!(reading.flow_m3h, 3.2);

        let stopped = json!({ "estado": "APAGADA" });
        assert!(!normalize_pump(&stopped).unwrap().running);
    }

    #[test]
    fn pump_without_state_is_rejected() {
        let obj = json!({ "caudal_m3h": 3.2 });
        assert!(normalize_pump(&obj).is_none());
    }
}
