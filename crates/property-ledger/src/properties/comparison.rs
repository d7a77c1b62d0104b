use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Absolute tolerance, in dollars, under which a price counts as equal to its average.
pub const PRICE_TOLERANCE: f64 = 0.01;

/// Position of a sale price relative to its suburb average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PriceComparison {
    Above,
    Below,
    Equal,
}

impl PriceComparison {
    pub fn label(&self) -> &'static str {
        match self {
            PriceComparison::Above => "above",
            PriceComparison::Below => "below",
            PriceComparison::Equal => "equal",
        }
    }
}

pub fn classify(price: f64, average: f64) -> PriceComparison {
    if (price - average).abs() < PRICE_TOLERANCE {
        return PriceComparison::Equal;
    }

    if price > average {
        PriceComparison::Above
    } else {
        PriceComparison::Below
    }
}
