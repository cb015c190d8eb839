//! Checkout domain module: cart aggregation and the payment lifecycle.
//!
//! This crate contains the order aggregation business rules, implemented
//! purely as deterministic domain logic (no IO, no UI, no timers). Simulated
//! latency lives in the terminal crate; randomness (order numbers) is passed
//! in as command data.

pub mod cart;
pub mod payment;
pub mod register;
pub mod totals;

pub use cart::{Cart, CartLine};
pub use payment::PaymentMethod;
pub use register::{
    AddToCart, BeginCheckout, CancelCheckout, CheckoutPhase, ClearCart, ClearCompletedOrder,
    CompletePayment, Register, RegisterCommand, RegisterEvent, RegisterId, RemoveFromCart,
    SelectCustomer, SelectDeliverer, StartPayment, UpdateQuantity, ORDER_NUMBER_MAX,
    ORDER_NUMBER_MIN,
};
pub use totals::{Totals, TAX_RATE};
