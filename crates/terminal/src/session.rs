//! The POS session: one register, one operator, in-memory data.

use chrono::TimeDelta;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tillpoint_catalog::{CatalogProvider, InMemoryCatalog, Product, ProductId};
use tillpoint_checkout::{
    AddToCart, BeginCheckout, CancelCheckout, ClearCart, ClearCompletedOrder, CompletePayment,
    PaymentMethod, Register, RegisterCommand, RegisterId, RemoveFromCart, SelectCustomer,
    SelectDeliverer, StartPayment, Totals, UpdateQuantity, ORDER_NUMBER_MAX, ORDER_NUMBER_MIN,
};
use tillpoint_core::{Aggregate, AggregateId, DomainError, DomainResult, Event};
use tillpoint_directory::{
    Customer, CustomerDirectory, CustomerId, Deliverer, DelivererDirectory, DelivererId,
};

use crate::clock::{Clock, TimerId, TimerKind, TimerQueue};

/// Simulated barcode lookup latency.
pub const SCAN_DELAY_MS: i64 = 500;
/// Simulated payment settlement latency.
pub const PAYMENT_DELAY_MS: i64 = 2000;
/// How long the order-complete banner stays up.
pub const BANNER_DELAY_MS: i64 = 3000;

/// Something the interface layer should surface to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A scanned code resolved to a product and it joined the cart.
    ProductScanned { product: Product },
    /// A scanned code matched nothing; recoverable, no state change.
    ProductNotFound { code: String },
    /// Payment settled and the register reset for the next order.
    PaymentSettled { order_number: u32 },
    /// The order-complete banner timed out.
    BannerCleared,
}

/// One terminal session: register, catalog, directories, timers.
///
/// All mutations flow through the register's command contract; the session
/// adds the lookups, the timers, and the order-number randomness the
/// aggregate deliberately keeps out of `handle`.
pub struct PosSession<C: Clock> {
    clock: C,
    register: Register,
    catalog: Box<dyn CatalogProvider>,
    customers: CustomerDirectory,
    deliverers: DelivererDirectory,
    timers: TimerQueue,
    pending_scan: Option<TimerId>,
    rng: StdRng,
}

impl<C: Clock> PosSession<C> {
    pub fn new(
        clock: C,
        catalog: Box<dyn CatalogProvider>,
        customers: CustomerDirectory,
        deliverers: DelivererDirectory,
        rng: StdRng,
    ) -> Self {
        Self {
            clock,
            register: Register::new(RegisterId::new(AggregateId::new())),
            catalog,
            customers,
            deliverers,
            timers: TimerQueue::new(),
            pending_scan: None,
            rng,
        }
    }

    /// Session preloaded with the sample data, seeded from the OS.
    pub fn sample(clock: C) -> Self {
        Self::new(
            clock,
            Box::new(InMemoryCatalog::sample()),
            CustomerDirectory::sample(),
            DelivererDirectory::sample(),
            StdRng::from_os_rng(),
        )
    }

    /// Sample session with a fixed RNG seed, for deterministic tests.
    pub fn sample_with_seed(clock: C, seed: u64) -> Self {
        Self::new(
            clock,
            Box::new(InMemoryCatalog::sample()),
            CustomerDirectory::sample(),
            DelivererDirectory::sample(),
            StdRng::seed_from_u64(seed),
        )
    }

    pub fn register(&self) -> &Register {
        &self.register
    }

    pub fn totals(&self) -> Totals {
        self.register.totals()
    }

    pub fn catalog(&self) -> &dyn CatalogProvider {
        self.catalog.as_ref()
    }

    pub fn customers(&self) -> &CustomerDirectory {
        &self.customers
    }

    pub fn deliverers(&self) -> &DelivererDirectory {
        &self.deliverers
    }

    /// Earliest pending timer, if any (used by the CLI to sleep precisely).
    pub fn next_timer_due(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.timers.next_due()
    }

    // --- cart -------------------------------------------------------------

    /// Add one unit of a catalog product (the grid path: only in-stock
    /// products are offered there, so anything else is not found).
    pub fn add_to_cart(&mut self, product_id: &ProductId) -> DomainResult<()> {
        let product = self
            .catalog
            .by_id(product_id)
            .filter(|p| p.in_stock)
            .cloned()
            .ok_or(DomainError::NotFound)?;
        self.dispatch(RegisterCommand::AddToCart(AddToCart {
            product,
            occurred_at: self.clock.now(),
        }))?;
        Ok(())
    }

    pub fn remove_from_cart(&mut self, product_id: ProductId) -> DomainResult<()> {
        self.dispatch(RegisterCommand::RemoveFromCart(RemoveFromCart {
            product_id,
            occurred_at: self.clock.now(),
        }))?;
        Ok(())
    }

    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> DomainResult<()> {
        self.dispatch(RegisterCommand::UpdateQuantity(UpdateQuantity {
            product_id,
            quantity,
            occurred_at: self.clock.now(),
        }))?;
        Ok(())
    }

    pub fn clear_cart(&mut self) -> DomainResult<()> {
        self.dispatch(RegisterCommand::ClearCart(ClearCart {
            occurred_at: self.clock.now(),
        }))?;
        Ok(())
    }

    // --- barcode ----------------------------------------------------------

    /// Begin a simulated barcode scan. Resolves on [`tick`](Self::tick) once
    /// the 500 ms lookup window has passed. A new scan replaces any scan
    /// still in flight; a blank code is ignored.
    pub fn scan(&mut self, code: &str) {
        let code = code.trim();
        if code.is_empty() {
            return;
        }
        if let Some(id) = self.pending_scan.take() {
            self.timers.cancel(id);
        }
        let due = self.clock.now() + TimeDelta::milliseconds(SCAN_DELAY_MS);
        let id = self.timers.schedule(
            due,
            TimerKind::BarcodeLookup {
                code: code.to_string(),
            },
        );
        self.pending_scan = Some(id);
        tracing::debug!(code, "barcode lookup scheduled");
    }

    // --- customer / deliverer --------------------------------------------

    /// Select a directory customer, or `None` to clear the selection.
    pub fn select_customer(&mut self, id: Option<CustomerId>) -> DomainResult<()> {
        let customer = match id {
            Some(id) => Some(
                self.customers
                    .by_id(&id)
                    .cloned()
                    .ok_or(DomainError::NotFound)?,
            ),
            None => None,
        };
        self.dispatch(RegisterCommand::SelectCustomer(SelectCustomer {
            customer,
            occurred_at: self.clock.now(),
        }))?;
        Ok(())
    }

    /// Add a new customer and immediately select them.
    pub fn add_customer(
        &mut self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> DomainResult<Customer> {
        let customer = self.customers.add(name, email, phone)?;
        self.dispatch(RegisterCommand::SelectCustomer(SelectCustomer {
            customer: Some(customer.clone()),
            occurred_at: self.clock.now(),
        }))?;
        Ok(customer)
    }

    /// Select a directory deliverer, or `None` to clear the selection.
    pub fn select_deliverer(&mut self, id: Option<DelivererId>) -> DomainResult<()> {
        let deliverer = match id {
            Some(id) => Some(
                self.deliverers
                    .by_id(&id)
                    .cloned()
                    .ok_or(DomainError::NotFound)?,
            ),
            None => None,
        };
        self.dispatch(RegisterCommand::SelectDeliverer(SelectDeliverer {
            deliverer,
            occurred_at: self.clock.now(),
        }))?;
        Ok(())
    }

    /// Add a new deliverer and immediately select them.
    pub fn add_deliverer(
        &mut self,
        name: &str,
        phone: &str,
        vehicle: Option<String>,
    ) -> DomainResult<Deliverer> {
        let deliverer = self.deliverers.add(name, phone, vehicle)?;
        self.dispatch(RegisterCommand::SelectDeliverer(SelectDeliverer {
            deliverer: Some(deliverer.clone()),
            occurred_at: self.clock.now(),
        }))?;
        Ok(deliverer)
    }

    // --- checkout ---------------------------------------------------------

    pub fn checkout(&mut self) -> DomainResult<()> {
        self.dispatch(RegisterCommand::BeginCheckout(BeginCheckout {
            occurred_at: self.clock.now(),
        }))?;
        Ok(())
    }

    pub fn cancel_checkout(&mut self) -> DomainResult<()> {
        self.dispatch(RegisterCommand::CancelCheckout(CancelCheckout {
            occurred_at: self.clock.now(),
        }))?;
        Ok(())
    }

    /// Start processing with the chosen method; settlement fires 2 s later.
    pub fn start_payment(&mut self, method: PaymentMethod) -> DomainResult<()> {
        self.dispatch(RegisterCommand::StartPayment(StartPayment {
            method,
            occurred_at: self.clock.now(),
        }))?;
        // A lookup still in flight is stale once processing starts; the cart
        // is frozen and about to be cleared anyway.
        if let Some(id) = self.pending_scan.take() {
            self.timers.cancel(id);
        }
        let due = self.clock.now() + TimeDelta::milliseconds(PAYMENT_DELAY_MS);
        self.timers.schedule(due, TimerKind::PaymentSettlement);
        Ok(())
    }

    // --- timers -----------------------------------------------------------

    /// Drain every due timer and return what happened.
    pub fn tick(&mut self) -> DomainResult<Vec<SessionOutcome>> {
        let now = self.clock.now();
        let fired = self.timers.fire_due(now);
        let mut outcomes = Vec::new();
        for kind in fired {
            match kind {
                TimerKind::BarcodeLookup { code } => {
                    self.pending_scan = None;
                    match self.catalog.by_sku(&code).cloned() {
                        Some(product) => {
                            // A scan that resolves while the cart is frozen
                            // is stale: drop it rather than bail out of the
                            // drain, or every later timer in this batch
                            // (settlement included) would be lost with it.
                            match self.dispatch(RegisterCommand::AddToCart(AddToCart {
                                product: product.clone(),
                                occurred_at: now,
                            })) {
                                Ok(_) => {
                                    outcomes.push(SessionOutcome::ProductScanned { product });
                                }
                                Err(err) => {
                                    tracing::debug!(code, %err, "stale scan dropped");
                                }
                            }
                        }
                        None => {
                            tracing::info!(code, "scanned code matched no product");
                            outcomes.push(SessionOutcome::ProductNotFound { code });
                        }
                    }
                }
                TimerKind::PaymentSettlement => {
                    let order_number =
                        self.rng.random_range(ORDER_NUMBER_MIN..ORDER_NUMBER_MAX);
                    self.dispatch(RegisterCommand::CompletePayment(CompletePayment {
                        order_number,
                        occurred_at: now,
                    }))?;
                    let due = now + TimeDelta::milliseconds(BANNER_DELAY_MS);
                    self.timers.schedule(due, TimerKind::BannerExpiry);
                    outcomes.push(SessionOutcome::PaymentSettled { order_number });
                }
                TimerKind::BannerExpiry => {
                    let events =
                        self.dispatch(RegisterCommand::ClearCompletedOrder(ClearCompletedOrder {
                            occurred_at: now,
                        }))?;
                    if !events.is_empty() {
                        outcomes.push(SessionOutcome::BannerCleared);
                    }
                }
            }
        }
        Ok(outcomes)
    }

    fn dispatch(
        &mut self,
        command: RegisterCommand,
    ) -> DomainResult<Vec<tillpoint_checkout::RegisterEvent>> {
        let events = self.register.handle(&command)?;
        for event in &events {
            self.register.apply(event);
            tracing::debug!(event = event.event_type(), "register event applied");
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;
    use tillpoint_checkout::CheckoutPhase;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn session() -> (PosSession<ManualClock>, ManualClock) {
        let clock = ManualClock::starting_at(t0());
        let session = PosSession::sample_with_seed(clock.clone(), 7);
        (session, clock)
    }

    fn espresso_id(session: &PosSession<ManualClock>) -> ProductId {
        session.catalog().by_sku("1001").unwrap().id
    }

    #[test]
    fn scan_resolves_after_lookup_delay() {
        let (mut session, clock) = session();
        session.scan("1001");

        assert!(session.tick().unwrap().is_empty());
        clock.advance(TimeDelta::milliseconds(SCAN_DELAY_MS - 1));
        assert!(session.tick().unwrap().is_empty());

        clock.advance(TimeDelta::milliseconds(1));
        let outcomes = session.tick().unwrap();
        assert!(matches!(
            outcomes.as_slice(),
            [SessionOutcome::ProductScanned { product }] if product.name == "Espresso"
        ));
        assert_eq!(session.register().cart().item_count(), 1);
    }

    #[test]
    fn scan_miss_reports_not_found_without_state_change() {
        let (mut session, clock) = session();
        session.scan("9999");
        clock.advance(TimeDelta::milliseconds(SCAN_DELAY_MS));

        let outcomes = session.tick().unwrap();
        assert_eq!(
            outcomes,
            vec![SessionOutcome::ProductNotFound {
                code: "9999".to_string()
            }]
        );
        assert!(session.register().cart().is_empty());
    }

    #[test]
    fn blank_scan_is_ignored() {
        let (mut session, _clock) = session();
        session.scan("   ");
        assert!(session.next_timer_due().is_none());
    }

    #[test]
    fn rescan_replaces_in_flight_lookup() {
        let (mut session, clock) = session();
        session.scan("9999");
        clock.advance(TimeDelta::milliseconds(200));
        session.scan("2001");
        clock.advance(TimeDelta::milliseconds(SCAN_DELAY_MS));

        let outcomes = session.tick().unwrap();
        assert!(matches!(
            outcomes.as_slice(),
            [SessionOutcome::ProductScanned { product }] if product.name == "Croissant"
        ));
    }

    #[test]
    fn add_to_cart_rejects_unknown_product() {
        let (mut session, _clock) = session();
        let err = session
            .add_to_cart(&ProductId::new(AggregateId::new()))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn add_to_cart_does_not_offer_out_of_stock_products() {
        let clock = ManualClock::starting_at(t0());
        let mut products = InMemoryCatalog::sample().products().to_vec();
        products[0].in_stock = false;
        let out_of_stock = products[0].id;
        let mut session = PosSession::new(
            clock,
            Box::new(InMemoryCatalog::new(products)),
            CustomerDirectory::sample(),
            DelivererDirectory::sample(),
            StdRng::seed_from_u64(7),
        );

        let err = session.add_to_cart(&out_of_stock).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn full_checkout_lifecycle_with_virtual_time() {
        let (mut session, clock) = session();
        let espresso = espresso_id(&session);
        session.add_to_cart(&espresso).unwrap();
        session.add_to_cart(&espresso).unwrap();
        assert_eq!(session.totals().subtotal, dec!(5.00));

        let john = session.customers().all()[0].id;
        session.select_customer(Some(john)).unwrap();
        let mike = session.deliverers().all()[0].id;
        session.select_deliverer(Some(mike)).unwrap();

        session.checkout().unwrap();
        assert_eq!(session.register().phase(), CheckoutPhase::AwaitingPayment);

        session.start_payment(PaymentMethod::Card).unwrap();
        assert!(matches!(
            session.register().phase(),
            CheckoutPhase::Processing { .. }
        ));

        // Settlement fires only after the full 2 s.
        clock.advance(TimeDelta::milliseconds(PAYMENT_DELAY_MS - 1));
        assert!(session.tick().unwrap().is_empty());
        clock.advance(TimeDelta::milliseconds(1));
        let outcomes = session.tick().unwrap();
        let order_number = match outcomes.as_slice() {
            [SessionOutcome::PaymentSettled { order_number }] => *order_number,
            other => panic!("unexpected outcomes: {other:?}"),
        };
        assert!((ORDER_NUMBER_MIN..ORDER_NUMBER_MAX).contains(&order_number));

        // Register reset, banner up.
        assert!(session.register().cart().is_empty());
        assert!(session.register().customer().is_none());
        assert!(session.register().deliverer().is_none());
        assert_eq!(session.register().active_order(), Some(order_number));

        // Banner clears after 3 s.
        clock.advance(TimeDelta::milliseconds(BANNER_DELAY_MS));
        let outcomes = session.tick().unwrap();
        assert_eq!(outcomes, vec![SessionOutcome::BannerCleared]);
        assert_eq!(session.register().phase(), CheckoutPhase::Idle);
    }

    #[test]
    fn scan_pending_at_payment_start_is_cancelled() {
        let (mut session, clock) = session();
        let espresso = espresso_id(&session);
        session.add_to_cart(&espresso).unwrap();

        // Scan still within its 500 ms window when payment starts.
        session.scan("1002");
        session.checkout().unwrap();
        session.start_payment(PaymentMethod::Card).unwrap();

        clock.advance(TimeDelta::milliseconds(PAYMENT_DELAY_MS));
        let outcomes = session.tick().unwrap();
        assert!(matches!(
            outcomes.as_slice(),
            [SessionOutcome::PaymentSettled { .. }]
        ));
        assert!(session.register().cart().is_empty());
        // Only the banner timer remains; the stale lookup never fires.
        clock.advance(TimeDelta::milliseconds(BANNER_DELAY_MS));
        assert_eq!(session.tick().unwrap(), vec![SessionOutcome::BannerCleared]);
        assert!(session.next_timer_due().is_none());
    }

    #[test]
    fn scan_during_processing_is_dropped_without_losing_settlement() {
        let (mut session, clock) = session();
        let espresso = espresso_id(&session);
        session.add_to_cart(&espresso).unwrap();
        session.checkout().unwrap();
        session.start_payment(PaymentMethod::Card).unwrap();

        // Lookup falls due before settlement, in the same drained batch.
        clock.advance(TimeDelta::milliseconds(100));
        session.scan("1002");
        clock.advance(TimeDelta::milliseconds(PAYMENT_DELAY_MS - 100));

        let outcomes = session.tick().unwrap();
        assert!(matches!(
            outcomes.as_slice(),
            [SessionOutcome::PaymentSettled { .. }]
        ));
        // The frozen-cart scan landed nowhere and the lifecycle moved on.
        assert!(session.register().cart().is_empty());
        assert!(matches!(
            session.register().phase(),
            CheckoutPhase::Completed { .. }
        ));
    }

    #[test]
    fn seeded_sessions_draw_identical_order_numbers() {
        let run = || {
            let clock = ManualClock::starting_at(t0());
            let mut session = PosSession::sample_with_seed(clock.clone(), 42);
            let espresso = espresso_id(&session);
            session.add_to_cart(&espresso).unwrap();
            session.checkout().unwrap();
            session.start_payment(PaymentMethod::Contactless).unwrap();
            clock.advance(TimeDelta::milliseconds(PAYMENT_DELAY_MS));
            match session.tick().unwrap().as_slice() {
                [SessionOutcome::PaymentSettled { order_number }] => *order_number,
                other => panic!("unexpected outcomes: {other:?}"),
            }
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn checkout_on_empty_cart_stays_idle() {
        let (mut session, _clock) = session();
        session.checkout().unwrap();
        assert_eq!(session.register().phase(), CheckoutPhase::Idle);
    }

    #[test]
    fn new_customer_is_added_and_selected() {
        let (mut session, _clock) = session();
        let customer = session
            .add_customer("Alice Cooper", "alice@example.com", "(555) 222-3333")
            .unwrap();
        assert_eq!(session.register().customer(), Some(&customer));
        assert_eq!(session.customers().all().len(), 4);
    }

    #[test]
    fn blank_customer_name_blocks_add_without_selection() {
        let (mut session, _clock) = session();
        let err = session.add_customer("  ", "", "").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(session.register().customer().is_none());
        assert_eq!(session.customers().all().len(), 3);
    }
}
