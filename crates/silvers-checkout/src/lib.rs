//! Cart, checkout and order placement for the storefront.

pub mod cart;
pub mod error;
pub mod favorites;
pub mod history;
pub mod order;
pub mod reference;
pub mod totals;
pub mod validate;

pub use cart::{Cart, CartItem, MAX_LINE_QUANTITY};
pub use error::CheckoutError;
pub use favorites::Favorites;
pub use history::{find_order, recent_orders, OrderSummary};
pub use order::{
    CheckoutIntent, CheckoutSettings, DraftLine, OrderAssembler, OrderDraft, OrderStage,
    PlacedOrder, Verification,
};
pub use reference::generate_reference;
pub use totals::{OrderTotals, Pricing, ShippingPolicy, TaxPolicy};
pub use validate::{Address, CustomerDetails, ValidationErrors};
