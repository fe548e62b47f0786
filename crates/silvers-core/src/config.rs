use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::{AppConfig, Environment, LineKeying, OrderWriteMode, ValidationProfile};
use crate::ConfigError;

const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x400?text=No+Image";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`
/// lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_decimal = |var: &str, default: &str| -> Result<Decimal, ConfigError> {
        let value = Decimal::from_str(or_default(var, default).trim())
            .map_err(|e| invalid(var, e.to_string()))?;
        if value.is_sign_negative() {
            return Err(invalid(var, "must not be negative".to_string()));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let pipeline_url = require("SILVERS_PIPELINE_URL")?;
    let auth_token = lookup("SILVERS_AUTH_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let env = parse_environment(&or_default("SILVERS_ENV", "development"))
        .map_err(|reason| invalid("SILVERS_ENV", reason))?;
    let log_level = or_default("SILVERS_LOG_LEVEL", "info");
    let request_timeout_secs = parse_positive_u64("SILVERS_REQUEST_TIMEOUT_SECS", "30")?;

    let currency = or_default("SILVERS_CURRENCY", "USD").trim().to_uppercase();
    let free_shipping_threshold = parse_decimal("SILVERS_FREE_SHIPPING_THRESHOLD", "75.00")?;
    let flat_shipping_fee = parse_decimal("SILVERS_FLAT_SHIPPING_FEE", "9.99")?;
    let tax_rate = match lookup("SILVERS_TAX_RATE") {
        Ok(raw) if !raw.trim().is_empty() => Some(parse_decimal("SILVERS_TAX_RATE", &raw)?),
        _ => None,
    };

    let order_write_mode = parse_write_mode(&or_default("SILVERS_ORDER_WRITE_MODE", "batched"))
        .map_err(|reason| invalid("SILVERS_ORDER_WRITE_MODE", reason))?;
    let verify_orders = parse_bool("SILVERS_VERIFY_ORDERS", "true")?;
    let cart_keying = parse_cart_keying(&or_default("SILVERS_CART_KEYING", "product"))
        .map_err(|reason| invalid("SILVERS_CART_KEYING", reason))?;
    let validation = parse_validation(&or_default("SILVERS_VALIDATION", "basic"))
        .map_err(|reason| invalid("SILVERS_VALIDATION", reason))?;
    let placeholder_image = or_default("SILVERS_PLACEHOLDER_IMAGE", DEFAULT_PLACEHOLDER_IMAGE);

    Ok(AppConfig {
        pipeline_url,
        auth_token,
        env,
        log_level,
        request_timeout_secs,
        currency,
        free_shipping_threshold,
        flat_shipping_fee,
        tax_rate,
        order_write_mode,
        verify_orders,
        cart_keying,
        validation,
        placeholder_image,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, String> {
    match s.trim() {
        "development" | "dev" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(format!(
            "unknown environment \"{other}\" (expected development, test or production)"
        )),
    }
}

fn parse_write_mode(s: &str) -> Result<OrderWriteMode, String> {
    match s.trim() {
        "batched" => Ok(OrderWriteMode::Batched),
        "sequential" => Ok(OrderWriteMode::Sequential),
        other => Err(format!(
            "unknown write mode \"{other}\" (expected batched or sequential)"
        )),
    }
}

fn parse_cart_keying(s: &str) -> Result<LineKeying, String> {
    match s.trim() {
        "product" => Ok(LineKeying::Product),
        "variant" => Ok(LineKeying::Variant),
        other => Err(format!(
            "unknown cart keying \"{other}\" (expected product or variant)"
        )),
    }
}

fn parse_validation(s: &str) -> Result<ValidationProfile, String> {
    match s.trim() {
        "basic" => Ok(ValidationProfile::Basic),
        "strict" => Ok(ValidationProfile::Strict),
        other => Err(format!(
            "unknown validation profile \"{other}\" (expected basic or strict)"
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
