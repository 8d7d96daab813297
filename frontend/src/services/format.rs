use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Shown wherever a value is null or absent
pub const PLACEHOLDER: &str = "—";

/// Fixed-point text with ties rounded away from zero, judged on the exact
/// binary value of `x`
fn fixed(x: f64, decimals: u32) -> String {
    match Decimal::from_f64_retain(x) {
        Some(d) => {
            let rounded = d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.*}", decimals as usize, rounded)
        }
        None => format!("{:.*}", decimals as usize, x),
    }
}

/// Integer-valued numbers print without decimals, everything else with two
pub fn fmt_number(x: f64) -> String {
    if x == 0.0 {
        "0".to_string()
    } else if x.is_finite() && x.fract() == 0.0 {
        format!("{:.0}", x)
    } else {
        fixed(x, 2)
    }
}

pub fn fmt_opt(x: Option<f64>) -> String {
    x.map(fmt_number).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Display text for an arbitrary JSON value
pub fn fmt_value(value: &Value) -> String {
    match value {
        Value::Null => PLACEHOLDER.to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(fmt_number).unwrap_or_else(|| n.to_string()),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn fmt_currency(x: Option<f64>) -> String {
    match x {
        Some(x) => format!("${}", fixed(x, 2)),
        None => PLACEHOLDER.to_string(),
    }
}

/// A 0..=1 ratio as a percentage with one decimal
pub fn fmt_percent(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{}%", fixed(r * 100.0, 1)),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn fmt_fixed(x: Option<f64>, decimals: u32) -> String {
    match x {
        Some(x) => fixed(x, decimals),
        None => PLACEHOLDER.to_string(),
    }
}

/// Count-like optional integers (KPIs)
pub fn fmt_count(x: Option<i64>) -> String {
    x.map(|v| v.to_string()).unwrap_or_else(|| PLACEHOLDER.to_string())
}
