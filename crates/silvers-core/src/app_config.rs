use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How an order's header and item rows reach the pipeline endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderWriteMode {
    /// One pipeline call carrying a transactional batch (header, items, commit).
    #[default]
    Batched,
    /// One call for the header, then one call per item, in cart order.
    Sequential,
}

impl std::fmt::Display for OrderWriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderWriteMode::Batched => write!(f, "batched"),
            OrderWriteMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// How cart lines are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKeying {
    /// One line per product id; a later add overwrites the selected options.
    #[default]
    Product,
    /// One line per product id plus normalized option selection.
    Variant,
}

/// Which rule set customer details are validated against before checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationProfile {
    /// Name and email required.
    #[default]
    Basic,
    /// Adds email shape, 10-digit phone, address, location and tax-identifier checks.
    Strict,
}

#[derive(Clone)]
pub struct AppConfig {
    pub pipeline_url: String,
    pub auth_token: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub currency: String,
    pub free_shipping_threshold: Decimal,
    pub flat_shipping_fee: Decimal,
    /// Fraction of the subtotal charged as tax (e.g. `0.08`). `None` disables computed tax.
    pub tax_rate: Option<Decimal>,
    pub order_write_mode: OrderWriteMode,
    pub verify_orders: bool,
    pub cart_keying: LineKeying,
    pub validation: ValidationProfile,
    pub placeholder_image: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("pipeline_url", &self.pipeline_url)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[redacted]"),
            )
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("currency", &self.currency)
            .field("free_shipping_threshold", &self.free_shipping_threshold)
            .field("flat_shipping_fee", &self.flat_shipping_fee)
            .field("tax_rate", &self.tax_rate)
            .field("order_write_mode", &self.order_write_mode)
            .field("verify_orders", &self.verify_orders)
            .field("cart_keying", &self.cart_keying)
            .field("validation", &self.validation)
            .field("placeholder_image", &self.placeholder_image)
            .finish()
    }
}
