use crate::errors::{EngineError, EngineResult};
use crate::models::{LatticeParameters, OptionStyle, PricingRequest, PricingResult};

/// Cox-Ross-Rubinstein binomial lattice pricer.
///
/// S(i,j) = S0 * u^(i-j) * d^j          (j down-moves after i steps)
/// V(n,j) = payoff(S(n,j))
/// V(i,j) = exp(-r*dt) * (p * V(i+1,j) + (1-p) * V(i+1,j+1))
///
/// American style takes max(intrinsic(S(i,j)), V(i,j)) at every interior node.
///
/// The lattice recombines (u*d = 1), so level i holds i+1 nodes and both
/// passes are O(n^2). Each call allocates its own lattice; nothing is shared.
#[derive(Debug, Clone, Copy)]
pub struct LatticePricer {
    request: PricingRequest,
    params: LatticeParameters,
}

impl LatticePricer {
    /// Derives tree parameters. No validation happens here.
    pub fn new(request: PricingRequest) -> Self {
        Self {
            request,
            params: LatticeParameters::derive(&request),
        }
    }

    #[inline]
    pub fn parameters(&self) -> LatticeParameters {
        self.params
    }

    /// Price the contract. Fails only on the distinguished numeric conditions:
    /// p outside [0, 1] or non-finite lattice values.
    pub fn price(&self) -> EngineResult<PricingResult> {
        let params = self.parameters();
        if !params.is_arbitrage_free() {
            return Err(EngineError::ArbitrageInconsistency {
                p: params.p,
                growth: params.growth(),
                u: params.u,
                d: params.d,
            });
        }

        let stock_prices = self.forward_pass()?;
        let option_values = self.backward_induction(&stock_prices);

        let option_price = option_values[0][0];
        if !option_price.is_finite() {
            return Err(EngineError::NumericOverflow(format!(
                "option value at root is {option_price}"
            )));
        }

        tracing::debug!(
            steps = self.request.steps,
            option_type = %self.request.option_type,
            option_style = %self.request.option_style,
            u = params.u,
            d = params.d,
            p = params.p,
            dt = params.dt,
            price = option_price,
            "lattice priced"
        );

        Ok(PricingResult {
            option_price,
            stock_prices,
            option_values,
            parameters: params,
        })
    }

    /// Underlying price at every node. Row i has i+1 entries.
    fn forward_pass(&self) -> EngineResult<Vec<Vec<f64>>> {
        let n = self.request.steps;
        let LatticeParameters { u, d, .. } = self.params;
        let s0 = self.request.spot;

        let mut prices = Vec::with_capacity(n + 1);
        for i in 0..=n {
            let mut row = Vec::with_capacity(i + 1);
            for j in 0..=i {
                let s = s0 * u.powi((i - j) as i32) * d.powi(j as i32);
                if !s.is_finite() {
                    return Err(EngineError::NumericOverflow(format!(
                        "stock price at node ({i}, {j}) is {s}; u={u}, steps={n}"
                    )));
                }
                row.push(s);
            }
            prices.push(row);
        }
        Ok(prices)
    }

    fn backward_induction(&self, stock_prices: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let n = self.request.steps;
        let strike = self.request.strike;
        let option_type = self.request.option_type;
        let american = self.request.option_style == OptionStyle::American;

        let p = self.params.p;
        let disc = self.params.discount();

        let mut values: Vec<Vec<f64>> = stock_prices.iter().map(|row| vec![0.0; row.len()]).collect();

        for (v, &s) in values[n].iter_mut().zip(&stock_prices[n]) {
            *v = option_type.intrinsic(s, strike);
        }

        for i in (0..n).rev() {
            let (head, tail) = values.split_at_mut(i + 1);
            let next = &tail[0];
            for (j, v) in head[i].iter_mut().enumerate() {
                let continuation = disc * (p * next[j] + (1.0 - p) * next[j + 1]);
                *v = if american {
                    option_type.intrinsic(stock_prices[i][j], strike).max(continuation)
                } else {
                    continuation
                };
            }
        }

        values
    }
}

/// Price one contract. Pure and reentrant.
pub fn price(request: &PricingRequest) -> EngineResult<PricingResult> {
    LatticePricer::new(*request).price()
}
