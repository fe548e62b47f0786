//! Order totals: subtotal, shipping, tax and grand total.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use silvers_core::AppConfig;

use crate::cart::Cart;

/// Free shipping at or above a threshold, a flat fee below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub free_threshold: Decimal,
    pub flat_fee: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Decimal::new(7500, 2),
            flat_fee: Decimal::new(999, 2),
        }
    }
}

impl ShippingPolicy {
    #[must_use]
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_threshold {
            Decimal::ZERO
        } else {
            self.flat_fee
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxPolicy {
    /// No tax is computed; amounts are written as zero.
    #[default]
    None,
    /// A fraction of the subtotal, e.g. `0.08` for 8%.
    Percentage(Decimal),
}

impl TaxPolicy {
    #[must_use]
    pub fn rate(&self) -> Decimal {
        match self {
            Self::None => Decimal::ZERO,
            Self::Percentage(rate) => *rate,
        }
    }

    /// Tax on `amount`, rounded half-up to cents.
    #[must_use]
    pub fn tax_for(&self, amount: Decimal) -> Decimal {
        round_cents(amount.saturating_mul(self.rate()))
    }
}

/// Money policy for one storefront.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pricing {
    pub shipping: ShippingPolicy,
    pub tax: TaxPolicy,
}

impl Pricing {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            shipping: ShippingPolicy {
                free_threshold: config.free_shipping_threshold,
                flat_fee: config.flat_shipping_fee,
            },
            tax: config.tax_rate.map_or(TaxPolicy::None, TaxPolicy::Percentage),
        }
    }

    /// Totals for the cart as it is now.
    #[must_use]
    pub fn totals(&self, cart: &Cart) -> OrderTotals {
        let subtotal = cart.subtotal();
        let shipping = self.shipping.shipping_for(subtotal);
        let tax_amount = self.tax.tax_for(subtotal);
        OrderTotals {
            subtotal,
            shipping,
            tax_amount,
            discount: Decimal::ZERO,
            total: subtotal.saturating_add(shipping).saturating_add(tax_amount),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax_amount: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

pub(crate) fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
