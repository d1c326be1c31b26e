use serde::Serialize;

use crate::{
    error::ApiResult,
    models::{expense, ledger},
    AppState,
};

use super::{aggregate, tax_service};

/// Raw figures the net-profit calculation works from.
#[derive(Debug, Clone, Copy)]
pub struct ProfitInputs {
    pub revenue_usd: f64,
    pub salaries_pkr: f64,
    pub expenses_pkr: f64,
    // mean of every stored tax percentage
    pub tax_percentage: f64,
    // PKR per USD
    pub conversion_rate: f64,
}

/// Unrounded results. Rounding only happens in [`NetProfitReport`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetProfit {
    pub revenue_usd: f64,
    pub salaries_pkr: f64,
    pub salaries_usd: f64,
    pub expenses_pkr: f64,
    pub expenses_usd: f64,
    pub profit_before_tax_usd: f64,
    pub tax_percentage: f64,
    pub tax_amount_usd: f64,
    pub net_profit_usd: f64,
    pub conversion_rate: f64,
}

pub fn compute_net_profit(inputs: &ProfitInputs) -> NetProfit {
    let salaries_usd = inputs.salaries_pkr / inputs.conversion_rate;
    let expenses_usd = inputs.expenses_pkr / inputs.conversion_rate;

    let profit_before_tax_usd = inputs.revenue_usd - (salaries_usd + expenses_usd);
    let tax_amount_usd = profit_before_tax_usd * (inputs.tax_percentage / 100.0);

    NetProfit {
        revenue_usd: inputs.revenue_usd,
        salaries_pkr: inputs.salaries_pkr,
        salaries_usd,
        expenses_pkr: inputs.expenses_pkr,
        expenses_usd,
        profit_before_tax_usd,
        tax_percentage: inputs.tax_percentage,
        tax_amount_usd,
        net_profit_usd: profit_before_tax_usd - tax_amount_usd,
        conversion_rate: inputs.conversion_rate,
    }
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub struct CurrencyPair {
    pub pkr: f64,
    pub usd: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetProfitReport {
    #[serde(rename = "totalRevenueUSD")]
    pub total_revenue_usd: f64,
    pub total_salaries: CurrencyPair,
    pub total_expenses: CurrencyPair,
    #[serde(rename = "profitBeforeTaxUSD")]
    pub profit_before_tax_usd: f64,
    pub tax_percentage: f64,
    #[serde(rename = "taxAmountUSD")]
    pub tax_amount_usd: f64,
    #[serde(rename = "netProfitUSD")]
    pub net_profit_usd: f64,
    pub conversion_rate: f64,
}

impl From<&NetProfit> for NetProfitReport {
    fn from(p: &NetProfit) -> Self {
        Self {
            total_revenue_usd: round2(p.revenue_usd),
            total_salaries: CurrencyPair {
                pkr: round2(p.salaries_pkr),
                usd: round2(p.salaries_usd),
            },
            total_expenses: CurrencyPair {
                pkr: round2(p.expenses_pkr),
                usd: round2(p.expenses_usd),
            },
            profit_before_tax_usd: round2(p.profit_before_tax_usd),
            tax_percentage: round2(p.tax_percentage),
            tax_amount_usd: round2(p.tax_amount_usd),
            net_profit_usd: round2(p.net_profit_usd),
            conversion_rate: p.conversion_rate,
        }
    }
}

/// Reads sales, salaries, expenses and taxes and computes net profit.
///
/// The rate is fetched first so an unavailable feed fails the request before
/// any collection is scanned.
pub async fn net_profit(state: &AppState) -> ApiResult<NetProfit> {
    let conversion_rate = state.rates.usd_to_pkr().await?;

    let (revenue_usd, _) =
        aggregate::sum_and_count(&state.db, ledger::SALES_COLLECTION, ledger::TOTAL_AMOUNT_FIELD).await?;
    let (salaries_pkr, _) =
        aggregate::sum_and_count(&state.db, ledger::SALARIES_COLLECTION, ledger::TOTAL_AMOUNT_FIELD).await?;
    let (expenses_pkr, _) = aggregate::sum_and_count(&state.db, expense::COLLECTION, "amount").await?;
    let tax_percentage = tax_service::average_percentage(state).await?;

    let result = compute_net_profit(&ProfitInputs {
        revenue_usd,
        salaries_pkr,
        expenses_pkr,
        tax_percentage,
        conversion_rate,
    });

    tracing::debug!(
        rate = conversion_rate,
        net_profit_usd = result.net_profit_usd,
        "net profit computed"
    );

    Ok(result)
}
