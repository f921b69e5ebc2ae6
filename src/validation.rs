//! Input validation for the `/calculate` endpoint.
//!
//! Turns a loosely typed JSON body into a `PricingRequest`. Numeric fields
//! accept JSON numbers or numeric strings. The pricer never sees input that
//! failed any of these checks.

use crate::errors::{EngineError, EngineResult};
use crate::models::{OptionStyle, OptionType, PricingRequest};
use serde::Deserialize;

/// A number sent either as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn as_f64(&self, field: &str) -> EngineResult<f64> {
        match self {
            Numeric::Number(v) => Ok(*v),
            Numeric::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| EngineError::InvalidParameter(format!("{field} must be a number"))),
        }
    }

    /// Integer coercion: numbers truncate toward zero, strings must be integral.
    fn as_i64(&self, field: &str) -> EngineResult<i64> {
        match self {
            Numeric::Number(v) if v.is_finite() => Ok(v.trunc() as i64),
            Numeric::Number(_) => Err(EngineError::InvalidParameter(format!(
                "{field} must be an integer"
            ))),
            Numeric::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| EngineError::InvalidParameter(format!("{field} must be an integer"))),
        }
    }
}

/// Body of `POST /calculate`. Keys follow the public wire format.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalculateRequest {
    #[serde(rename = "S0")]
    pub spot: Option<Numeric>,
    #[serde(rename = "K")]
    pub strike: Option<Numeric>,
    #[serde(rename = "T")]
    pub maturity: Option<Numeric>,
    pub r: Option<Numeric>,
    pub sigma: Option<Numeric>,
    pub n_steps: Option<Numeric>,
    pub option_type: Option<String>,
    pub option_style: Option<String>,
}

fn required<'a>(value: &'a Option<Numeric>, field: &str) -> EngineResult<&'a Numeric> {
    value
        .as_ref()
        .ok_or_else(|| EngineError::InvalidParameter(format!("missing field {field}")))
}

fn finite(value: f64, field: &str) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::InvalidParameter(format!("{field} must be finite")))
    }
}

/// Validate a request body against the pricer's preconditions.
///
/// Check order: presence/parse, positivity, volatility, step ceiling,
/// option type, option style.
pub fn validate(body: &CalculateRequest, max_steps: usize) -> EngineResult<PricingRequest> {
    let spot = finite(required(&body.spot, "S0")?.as_f64("S0")?, "S0")?;
    let strike = finite(required(&body.strike, "K")?.as_f64("K")?, "K")?;
    let maturity = finite(required(&body.maturity, "T")?.as_f64("T")?, "T")?;
    let rate = finite(required(&body.r, "r")?.as_f64("r")?, "r")?;
    let volatility = finite(required(&body.sigma, "sigma")?.as_f64("sigma")?, "sigma")?;
    let steps = required(&body.n_steps, "n_steps")?.as_i64("n_steps")?;
    let option_type = body
        .option_type
        .as_deref()
        .ok_or_else(|| EngineError::InvalidParameter("missing field option_type".into()))?;

    if spot <= 0.0 || strike <= 0.0 || maturity <= 0.0 || steps <= 0 {
        return Err(EngineError::InvalidParameter(
            "parameters must be positive".into(),
        ));
    }

    if volatility <= 0.0 {
        return Err(EngineError::InvalidParameter(
            "volatility must be positive".into(),
        ));
    }

    let steps = usize::try_from(steps)
        .ok()
        .filter(|&n| n <= max_steps)
        .ok_or_else(|| {
            EngineError::InvalidParameter(format!("n_steps must not exceed {max_steps}"))
        })?;

    let option_type = OptionType::parse(option_type).ok_or_else(|| {
        EngineError::InvalidEnum("option type must be \"call\" or \"put\"".into())
    })?;

    let option_style = match body.option_style.as_deref() {
        None => OptionStyle::default(),
        Some(s) => OptionStyle::parse(s).ok_or_else(|| {
            EngineError::InvalidEnum("option style must be \"european\" or \"american\"".into())
        })?,
    };

    Ok(PricingRequest {
        spot,
        strike,
        maturity,
        rate,
        volatility,
        steps,
        option_type,
        option_style,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> CalculateRequest {
        serde_json::from_value(value).unwrap()
    }

    fn base() -> serde_json::Value {
        json!({
            "S0": 100, "K": 100, "T": 1, "r": 0.05, "sigma": 0.2,
            "n_steps": 2, "option_type": "call"
        })
    }

    fn with(key: &str, value: serde_json::Value) -> CalculateRequest {
        let mut v = base();
        v[key] = value;
        body(v)
    }

    #[test]
    fn test_valid_defaults_to_european() {
        let req = validate(&body(base()), 5000).unwrap();
        assert_eq!(req.spot, 100.0);
        assert_eq!(req.steps, 2);
        assert_eq!(req.option_type, OptionType::Call);
        assert_eq!(req.option_style, OptionStyle::European);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let req = validate(
            &body(json!({
                "S0": "42.5", "K": " 40 ", "T": "0.5", "r": "-0.01", "sigma": "0.3",
                "n_steps": "10", "option_type": "put", "option_style": "american"
            })),
            5000,
        )
        .unwrap();
        assert_eq!(req.spot, 42.5);
        assert_eq!(req.strike, 40.0);
        assert_eq!(req.rate, -0.01);
        assert_eq!(req.steps, 10);
        assert_eq!(req.option_style, OptionStyle::American);
    }

    #[test]
    fn test_fractional_steps_truncate() {
        let req = validate(&with("n_steps", json!(7.9)), 5000).unwrap();
        assert_eq!(req.steps, 7);
    }

    #[test]
    fn test_non_positive_rejected() {
        for key in ["S0", "K", "T", "n_steps"] {
            let err = validate(&with(key, json!(0)), 5000).unwrap_err();
            assert!(
                matches!(err, EngineError::InvalidParameter(ref m) if m == "parameters must be positive"),
                "{key}: {err}"
            );
        }
        // 0.4 truncates to 0 steps
        assert!(validate(&with("n_steps", json!(0.4)), 5000).is_err());
    }

    #[test]
    fn test_volatility_rejected() {
        let err = validate(&with("sigma", json!(-0.2)), 5000).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(ref m) if m == "volatility must be positive"));
    }

    #[test]
    fn test_negative_rate_allowed() {
        assert!(validate(&with("r", json!(-0.02)), 5000).is_ok());
    }

    #[test]
    fn test_missing_and_garbage_fields() {
        let mut v = base();
        v.as_object_mut().unwrap().remove("K");
        let err = validate(&body(v), 5000).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(ref m) if m.contains('K')));

        let err = validate(&with("sigma", json!("abc")), 5000).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));

        let err = validate(&with("r", json!("NaN")), 5000).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(ref m) if m.contains("finite")));
    }

    #[test]
    fn test_step_ceiling() {
        assert!(validate(&with("n_steps", json!(100)), 100).is_ok());
        let err = validate(&with("n_steps", json!(101)), 100).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(ref m) if m.contains("100")));
    }

    #[test]
    fn test_unknown_kinds_rejected() {
        let err = validate(&with("option_type", json!("straddle")), 5000).unwrap_err();
        assert!(matches!(err, EngineError::InvalidEnum(_)));

        let err = validate(&with("option_style", json!("bermudan")), 5000).unwrap_err();
        assert!(matches!(err, EngineError::InvalidEnum(_)));
    }

    #[test]
    fn test_positivity_checked_before_kind() {
        let mut v = base();
        v["S0"] = json!(-1);
        v["option_type"] = json!("straddle");
        let err = validate(&body(v), 5000).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
    }
}
