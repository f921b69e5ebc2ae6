pub mod binomial;

use serde::{Deserialize, Serialize};

/// Option type (call or put). The payoff is the only place it enters pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Immediate exercise value at the given underlying price.
    #[inline]
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "call" => Some(OptionType::Call),
            "put" => Some(OptionType::Put),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Exercise style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionStyle {
    #[default]
    European,
    American,
}

impl OptionStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "european" => Some(OptionStyle::European),
            "american" => Some(OptionStyle::American),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::European => write!(f, "european"),
            Self::American => write!(f, "american"),
        }
    }
}

/// Validated pricing inputs. Positivity of spot, strike, maturity,
/// volatility and steps is the validator's job; the pricer does not re-check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub spot: f64,
    pub strike: f64,
    /// Years to expiry
    pub maturity: f64,
    /// Continuously-compounded risk-free rate
    pub rate: f64,
    /// Annualized volatility
    pub volatility: f64,
    pub steps: usize,
    pub option_type: OptionType,
    #[serde(default)]
    pub option_style: OptionStyle,
}

/// Per-step tree parameters derived once per request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatticeParameters {
    pub u: f64,
    pub d: f64,
    pub p: f64,
    pub dt: f64,
    #[serde(skip)]
    rate: f64,
}

impl LatticeParameters {
    /// dt = T/n, u = exp(sigma*sqrt(dt)), d = 1/u,
    /// p = (exp(r*dt) - d) / (u - d)
    pub fn derive(request: &PricingRequest) -> Self {
        let dt = request.maturity / request.steps as f64;
        let u = (request.volatility * dt.sqrt()).exp();
        let d = 1.0 / u;
        let growth = (request.rate * dt).exp();
        let p = (growth - d) / (u - d);
        Self { u, d, p, dt, rate: request.rate }
    }

    /// One-step risk-free growth factor exp(r*dt).
    #[inline]
    pub fn growth(&self) -> f64 {
        (self.rate * self.dt).exp()
    }

    /// One-step discount factor exp(-r*dt).
    #[inline]
    pub fn discount(&self) -> f64 {
        (-self.rate * self.dt).exp()
    }

    /// No-arbitrage holds iff d <= exp(r*dt) <= u, i.e. p in [0, 1].
    #[inline]
    pub fn is_arbitrage_free(&self) -> bool {
        self.p.is_finite() && (0.0..=1.0).contains(&self.p)
    }
}

/// Output of one pricing call. Tables are triangular: row i has i+1 nodes,
/// node j counting down-moves from the origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingResult {
    pub option_price: f64,
    pub stock_prices: Vec<Vec<f64>>,
    pub option_values: Vec<Vec<f64>>,
    pub parameters: LatticeParameters,
}
