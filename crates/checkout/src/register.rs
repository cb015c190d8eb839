use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tillpoint_catalog::{Product, ProductId};
use tillpoint_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Event};
use tillpoint_directory::{Customer, Deliverer};

use crate::cart::Cart;
use crate::payment::PaymentMethod;
use crate::totals::Totals;

/// Display order numbers are drawn from `[ORDER_NUMBER_MIN, ORDER_NUMBER_MAX)`.
pub const ORDER_NUMBER_MIN: u32 = 1000;
pub const ORDER_NUMBER_MAX: u32 = 11000;

/// Register identifier (one register per session).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterId(pub AggregateId);

impl RegisterId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for RegisterId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Checkout lifecycle phase.
///
/// `Idle → AwaitingPayment → Processing → Completed → Idle`. `Completed`
/// carries the display order number for the banner window; the terminal layer
/// clears it on a timer. Settlement has no failure path: `Processing` always
/// reaches `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum CheckoutPhase {
    Idle,
    AwaitingPayment,
    Processing { method: PaymentMethod },
    Completed { order_number: u32 },
}

/// Aggregate root: Register — the order aggregator.
///
/// Owns the cart, the optional customer/deliverer selections, and the
/// checkout phase. Decision logic (`handle`) and state evolution (`apply`)
/// are strictly separated; `handle` is pure and deterministic, which is why
/// the random order number arrives as command data rather than being drawn
/// here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    id: RegisterId,
    cart: Cart,
    customer: Option<Customer>,
    deliverer: Option<Deliverer>,
    phase: CheckoutPhase,
    version: u64,
}

impl Register {
    /// Fresh register: empty cart, no selections, idle.
    pub fn new(id: RegisterId) -> Self {
        Self {
            id,
            cart: Cart::new(),
            customer: None,
            deliverer: None,
            phase: CheckoutPhase::Idle,
            version: 0,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn deliverer(&self) -> Option<&Deliverer> {
        self.deliverer.as_ref()
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Order number currently shown in the completion banner, if any.
    pub fn active_order(&self) -> Option<u32> {
        match self.phase {
            CheckoutPhase::Completed { order_number } => Some(order_number),
            _ => None,
        }
    }

    pub fn totals(&self) -> Totals {
        Totals::for_cart(&self.cart)
    }

    /// Cart and selection changes are blocked only while a payment is being
    /// processed. In particular they stay possible during the completion
    /// banner window, when the cart has already been cleared.
    fn is_cart_mutable(&self) -> bool {
        !matches!(self.phase, CheckoutPhase::Processing { .. })
    }
}

impl AggregateRoot for Register {
    type Id = RegisterId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddToCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCart {
    pub product: Product,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveFromCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveFromCart {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuantity {
    pub product_id: ProductId,
    /// Zero or negative behaves exactly like [`RemoveFromCart`].
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    pub occurred_at: DateTime<Utc>,
}

/// Command: SelectCustomer (`None` clears the selection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectCustomer {
    pub customer: Option<Customer>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SelectDeliverer (`None` clears the selection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectDeliverer {
    pub deliverer: Option<Deliverer>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: BeginCheckout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginCheckout {
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelCheckout (close the payment screen before processing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelCheckout {
    pub occurred_at: DateTime<Utc>,
}

/// Command: StartPayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPayment {
    pub method: PaymentMethod,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompletePayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletePayment {
    /// Display order number, drawn by the caller from
    /// `[ORDER_NUMBER_MIN, ORDER_NUMBER_MAX)`.
    pub order_number: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCompletedOrder (banner window expired).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCompletedOrder {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterCommand {
    AddToCart(AddToCart),
    RemoveFromCart(RemoveFromCart),
    UpdateQuantity(UpdateQuantity),
    ClearCart(ClearCart),
    SelectCustomer(SelectCustomer),
    SelectDeliverer(SelectDeliverer),
    BeginCheckout(BeginCheckout),
    CancelCheckout(CancelCheckout),
    StartPayment(StartPayment),
    CompletePayment(CompletePayment),
    ClearCompletedOrder(ClearCompletedOrder),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterEvent {
    /// A new line joined the cart with quantity 1.
    LineAdded {
        product: Product,
        occurred_at: DateTime<Utc>,
    },
    /// An existing line's quantity was set (increments included).
    LineQuantitySet {
        product_id: ProductId,
        quantity: i64,
        occurred_at: DateTime<Utc>,
    },
    LineRemoved {
        product_id: ProductId,
        occurred_at: DateTime<Utc>,
    },
    CartCleared {
        occurred_at: DateTime<Utc>,
    },
    CustomerSelected {
        customer: Option<Customer>,
        occurred_at: DateTime<Utc>,
    },
    DelivererSelected {
        deliverer: Option<Deliverer>,
        occurred_at: DateTime<Utc>,
    },
    CheckoutStarted {
        occurred_at: DateTime<Utc>,
    },
    CheckoutCancelled {
        occurred_at: DateTime<Utc>,
    },
    PaymentStarted {
        method: PaymentMethod,
        occurred_at: DateTime<Utc>,
    },
    PaymentCompleted {
        order_number: u32,
        occurred_at: DateTime<Utc>,
    },
    CompletedOrderCleared {
        occurred_at: DateTime<Utc>,
    },
}

impl Event for RegisterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RegisterEvent::LineAdded { .. } => "checkout.cart.line_added",
            RegisterEvent::LineQuantitySet { .. } => "checkout.cart.line_quantity_set",
            RegisterEvent::LineRemoved { .. } => "checkout.cart.line_removed",
            RegisterEvent::CartCleared { .. } => "checkout.cart.cleared",
            RegisterEvent::CustomerSelected { .. } => "checkout.customer.selected",
            RegisterEvent::DelivererSelected { .. } => "checkout.deliverer.selected",
            RegisterEvent::CheckoutStarted { .. } => "checkout.started",
            RegisterEvent::CheckoutCancelled { .. } => "checkout.cancelled",
            RegisterEvent::PaymentStarted { .. } => "checkout.payment.started",
            RegisterEvent::PaymentCompleted { .. } => "checkout.payment.completed",
            RegisterEvent::CompletedOrderCleared { .. } => "checkout.order.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RegisterEvent::LineAdded { occurred_at, .. }
            | RegisterEvent::LineQuantitySet { occurred_at, .. }
            | RegisterEvent::LineRemoved { occurred_at, .. }
            | RegisterEvent::CartCleared { occurred_at }
            | RegisterEvent::CustomerSelected { occurred_at, .. }
            | RegisterEvent::DelivererSelected { occurred_at, .. }
            | RegisterEvent::CheckoutStarted { occurred_at }
            | RegisterEvent::CheckoutCancelled { occurred_at }
            | RegisterEvent::PaymentStarted { occurred_at, .. }
            | RegisterEvent::PaymentCompleted { occurred_at, .. }
            | RegisterEvent::CompletedOrderCleared { occurred_at } => *occurred_at,
        }
    }
}

impl Aggregate for Register {
    type Command = RegisterCommand;
    type Event = RegisterEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            RegisterEvent::LineAdded { product, .. } => {
                self.cart.push_line(product.clone());
            }
            RegisterEvent::LineQuantitySet {
                product_id,
                quantity,
                ..
            } => {
                self.cart.set_quantity(product_id, *quantity);
            }
            RegisterEvent::LineRemoved { product_id, .. } => {
                self.cart.remove(product_id);
            }
            RegisterEvent::CartCleared { .. } => {
                self.cart.clear();
            }
            RegisterEvent::CustomerSelected { customer, .. } => {
                self.customer = customer.clone();
            }
            RegisterEvent::DelivererSelected { deliverer, .. } => {
                self.deliverer = deliverer.clone();
            }
            RegisterEvent::CheckoutStarted { .. } => {
                self.phase = CheckoutPhase::AwaitingPayment;
            }
            RegisterEvent::CheckoutCancelled { .. } => {
                self.phase = CheckoutPhase::Idle;
            }
            RegisterEvent::PaymentStarted { method, .. } => {
                self.phase = CheckoutPhase::Processing { method: *method };
            }
            RegisterEvent::PaymentCompleted { order_number, .. } => {
                // Atomic reset: the completed order keeps no link to the cart.
                self.cart.clear();
                self.customer = None;
                self.deliverer = None;
                self.phase = CheckoutPhase::Completed {
                    order_number: *order_number,
                };
            }
            RegisterEvent::CompletedOrderCleared { .. } => {
                self.phase = CheckoutPhase::Idle;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            RegisterCommand::AddToCart(cmd) => self.handle_add_to_cart(cmd),
            RegisterCommand::RemoveFromCart(cmd) => self.handle_remove_from_cart(cmd),
            RegisterCommand::UpdateQuantity(cmd) => self.handle_update_quantity(cmd),
            RegisterCommand::ClearCart(cmd) => self.handle_clear_cart(cmd),
            RegisterCommand::SelectCustomer(cmd) => self.handle_select_customer(cmd),
            RegisterCommand::SelectDeliverer(cmd) => self.handle_select_deliverer(cmd),
            RegisterCommand::BeginCheckout(cmd) => self.handle_begin_checkout(cmd),
            RegisterCommand::CancelCheckout(cmd) => self.handle_cancel_checkout(cmd),
            RegisterCommand::StartPayment(cmd) => self.handle_start_payment(cmd),
            RegisterCommand::CompletePayment(cmd) => self.handle_complete_payment(cmd),
            RegisterCommand::ClearCompletedOrder(cmd) => self.handle_clear_completed_order(cmd),
        }
    }
}

impl Register {
    fn ensure_cart_mutable(&self) -> Result<(), DomainError> {
        if self.is_cart_mutable() {
            Ok(())
        } else {
            Err(DomainError::invariant(
                "cannot modify cart while payment is processing",
            ))
        }
    }

    fn handle_add_to_cart(&self, cmd: &AddToCart) -> Result<Vec<RegisterEvent>, DomainError> {
        self.ensure_cart_mutable()?;

        let event = match self.cart.line(&cmd.product.id) {
            Some(line) => RegisterEvent::LineQuantitySet {
                product_id: cmd.product.id,
                quantity: line.quantity + 1,
                occurred_at: cmd.occurred_at,
            },
            None => RegisterEvent::LineAdded {
                product: cmd.product.clone(),
                occurred_at: cmd.occurred_at,
            },
        };
        Ok(vec![event])
    }

    fn handle_remove_from_cart(
        &self,
        cmd: &RemoveFromCart,
    ) -> Result<Vec<RegisterEvent>, DomainError> {
        self.ensure_cart_mutable()?;

        // Removing an absent line is a designed-in no-op, not an error.
        if self.cart.line(&cmd.product_id).is_none() {
            return Ok(vec![]);
        }
        Ok(vec![RegisterEvent::LineRemoved {
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_update_quantity(
        &self,
        cmd: &UpdateQuantity,
    ) -> Result<Vec<RegisterEvent>, DomainError> {
        self.ensure_cart_mutable()?;

        if cmd.quantity <= 0 {
            return self.handle_remove_from_cart(&RemoveFromCart {
                product_id: cmd.product_id,
                occurred_at: cmd.occurred_at,
            });
        }

        // Lines are only ever created via AddToCart.
        if self.cart.line(&cmd.product_id).is_none() {
            return Ok(vec![]);
        }
        Ok(vec![RegisterEvent::LineQuantitySet {
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_clear_cart(&self, cmd: &ClearCart) -> Result<Vec<RegisterEvent>, DomainError> {
        self.ensure_cart_mutable()?;

        if self.cart.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![RegisterEvent::CartCleared {
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_select_customer(
        &self,
        cmd: &SelectCustomer,
    ) -> Result<Vec<RegisterEvent>, DomainError> {
        self.ensure_cart_mutable()?;

        Ok(vec![RegisterEvent::CustomerSelected {
            customer: cmd.customer.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_select_deliverer(
        &self,
        cmd: &SelectDeliverer,
    ) -> Result<Vec<RegisterEvent>, DomainError> {
        self.ensure_cart_mutable()?;

        Ok(vec![RegisterEvent::DelivererSelected {
            deliverer: cmd.deliverer.clone(),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_begin_checkout(
        &self,
        cmd: &BeginCheckout,
    ) -> Result<Vec<RegisterEvent>, DomainError> {
        // Guarded: only an idle register with a non-empty cart proceeds to
        // payment; everything else is a silent no-op.
        if self.phase != CheckoutPhase::Idle || self.cart.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![RegisterEvent::CheckoutStarted {
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_cancel_checkout(
        &self,
        cmd: &CancelCheckout,
    ) -> Result<Vec<RegisterEvent>, DomainError> {
        // Closing the payment screen is only meaningful before processing
        // starts; afterwards the cancel is ignored.
        if self.phase != CheckoutPhase::AwaitingPayment {
            return Ok(vec![]);
        }
        Ok(vec![RegisterEvent::CheckoutCancelled {
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_start_payment(
        &self,
        cmd: &StartPayment,
    ) -> Result<Vec<RegisterEvent>, DomainError> {
        if self.phase != CheckoutPhase::AwaitingPayment {
            return Err(DomainError::invariant(
                "payment can only start from an awaiting-payment checkout",
            ));
        }
        Ok(vec![RegisterEvent::PaymentStarted {
            method: cmd.method,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_complete_payment(
        &self,
        cmd: &CompletePayment,
    ) -> Result<Vec<RegisterEvent>, DomainError> {
        if !matches!(self.phase, CheckoutPhase::Processing { .. }) {
            return Err(DomainError::invariant(
                "payment can only complete while processing",
            ));
        }
        if !(ORDER_NUMBER_MIN..ORDER_NUMBER_MAX).contains(&cmd.order_number) {
            return Err(DomainError::validation(format!(
                "order number {} outside [{ORDER_NUMBER_MIN}, {ORDER_NUMBER_MAX})",
                cmd.order_number
            )));
        }
        Ok(vec![RegisterEvent::PaymentCompleted {
            order_number: cmd.order_number,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_clear_completed_order(
        &self,
        cmd: &ClearCompletedOrder,
    ) -> Result<Vec<RegisterEvent>, DomainError> {
        // The banner timer may fire after the phase already moved on.
        if !matches!(self.phase, CheckoutPhase::Completed { .. }) {
            return Ok(vec![]);
        }
        Ok(vec![RegisterEvent::CompletedOrderCleared {
            occurred_at: cmd.occurred_at,
        }])
    }
}
