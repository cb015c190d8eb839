//! Interactive demo terminal.
//!
//! A small REPL over [`PosSession`]: browse the catalog, ring up a cart,
//! scan barcodes, pick a customer/deliverer, and run the simulated payment
//! flow. Simulated delays run on the wall clock here; tests drive the same
//! session with a manual clock instead.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;

use tillpoint_catalog::ProductFilter;
use tillpoint_checkout::PaymentMethod;
use tillpoint_core::money;
use tillpoint_terminal::{PosSession, SessionOutcome, SystemClock};

fn main() -> Result<()> {
    tillpoint_observability::init();

    let mut session = PosSession::sample(SystemClock);
    println!("tillpoint demo terminal — type 'help' for commands");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        drain_due(&mut session)?;
        print!("till> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let line = line.trim();
        let Some(command) = line.split_whitespace().next() else {
            continue;
        };
        let rest = line[command.len()..].trim();

        let result = match command {
            "help" => {
                print_help();
                Ok(())
            }
            "products" => {
                list_products(&session, rest);
                Ok(())
            }
            "cart" => {
                print_cart(&session);
                Ok(())
            }
            "add" => add_by_sku(&mut session, rest),
            "rm" => remove_by_sku(&mut session, rest),
            "qty" => set_quantity(&mut session, rest),
            "clear" => session.clear_cart().map_err(Into::into),
            "scan" => {
                session.scan(rest);
                settle(&mut session)
            }
            "customers" => {
                for customer in session.customers().search(rest) {
                    println!("  {} <{}> {}", customer.name, customer.email, customer.phone);
                }
                Ok(())
            }
            "customer" => pick_customer(&mut session, rest),
            "deliverers" => {
                for deliverer in session.deliverers().search(rest) {
                    let vehicle = deliverer.vehicle.as_deref().unwrap_or("-");
                    println!("  {} {} ({vehicle})", deliverer.name, deliverer.phone);
                }
                Ok(())
            }
            "deliverer" => pick_deliverer(&mut session, rest),
            "checkout" => session.checkout().map_err(Into::into).map(|()| {
                print_cart(&session);
            }),
            "cancel" => session.cancel_checkout().map_err(Into::into),
            "pay" => pay(&mut session, rest),
            "quit" | "exit" => break,
            other => {
                println!("unknown command '{other}' — try 'help'");
                Ok(())
            }
        };

        if let Err(err) = result {
            println!("error: {err}");
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        "\
  products [term]          list in-stock products (optionally filtered)
  add <sku>                add a product to the cart
  rm <sku>                 remove a cart line
  qty <sku> <n>            set a line quantity (0 removes)
  clear                    empty the cart
  cart                     show the cart and totals
  scan <code>              simulated barcode scan (500ms)
  customers [term]         search the customer directory
  customer <term> | -      select the first match, or clear
  deliverers [term]        search the deliverer directory
  deliverer <term> | -     select the first match, or clear
  checkout                 begin checkout (requires a non-empty cart)
  cancel                   back out of checkout before paying
  pay <card|contactless>   process payment (2s simulated settlement)
  quit"
    );
}

fn list_products(session: &PosSession<SystemClock>, term: &str) {
    let filter = ProductFilter {
        term: (!term.is_empty()).then(|| term.to_string()),
        category: None,
    };
    for product in session.catalog().search(&filter) {
        let sku = product.sku.as_deref().unwrap_or("-");
        println!(
            "  [{sku}] {:24} {:8} {}",
            product.name,
            money::format_usd(product.price),
            product.category
        );
    }
}

fn print_cart(session: &PosSession<SystemClock>) {
    let cart = session.register().cart();
    if cart.is_empty() {
        println!("  cart is empty");
        return;
    }
    for line in cart.lines() {
        println!(
            "  {:24} x{:<3} {}",
            line.product.name,
            line.quantity,
            money::format_usd(line.amount())
        );
    }
    let totals = session.totals();
    println!("  subtotal {}", money::format_usd(totals.subtotal));
    println!("  tax      {}", money::format_usd(totals.tax));
    println!("  total    {}", money::format_usd(totals.total));
    if let Some(customer) = session.register().customer() {
        println!("  customer: {}", customer.name);
    }
    if let Some(deliverer) = session.register().deliverer() {
        println!("  deliverer: {}", deliverer.name);
    }
}

fn add_by_sku(session: &mut PosSession<SystemClock>, sku: &str) -> Result<()> {
    let Some(product) = session.catalog().by_sku(sku) else {
        println!("no product with SKU '{sku}'");
        return Ok(());
    };
    let id = product.id;
    session.add_to_cart(&id)?;
    print_cart(session);
    Ok(())
}

fn remove_by_sku(session: &mut PosSession<SystemClock>, sku: &str) -> Result<()> {
    if let Some(product) = session.catalog().by_sku(sku) {
        let id = product.id;
        session.remove_from_cart(id)?;
    }
    Ok(())
}

fn set_quantity(session: &mut PosSession<SystemClock>, rest: &str) -> Result<()> {
    let mut parts = rest.split_whitespace();
    let (Some(sku), Some(quantity)) = (parts.next(), parts.next()) else {
        println!("usage: qty <sku> <n>");
        return Ok(());
    };
    let quantity: i64 = quantity.parse()?;
    if let Some(product) = session.catalog().by_sku(sku) {
        let id = product.id;
        session.update_quantity(id, quantity)?;
        print_cart(session);
    }
    Ok(())
}

fn pick_customer(session: &mut PosSession<SystemClock>, term: &str) -> Result<()> {
    if term == "-" {
        session.select_customer(None)?;
        return Ok(());
    }
    let Some(id) = session.customers().search(term).first().map(|c| c.id) else {
        println!("no customer matching '{term}'");
        return Ok(());
    };
    session.select_customer(Some(id))?;
    Ok(())
}

fn pick_deliverer(session: &mut PosSession<SystemClock>, term: &str) -> Result<()> {
    if term == "-" {
        session.select_deliverer(None)?;
        return Ok(());
    }
    let Some(id) = session.deliverers().search(term).first().map(|d| d.id) else {
        println!("no deliverer matching '{term}'");
        return Ok(());
    };
    session.select_deliverer(Some(id))?;
    Ok(())
}

fn pay(session: &mut PosSession<SystemClock>, method: &str) -> Result<()> {
    let method: PaymentMethod = method.parse()?;
    session.start_payment(method)?;
    println!("processing {method}...");
    settle(session)
}

/// Sleep through pending timers until something user-visible happens.
/// Banner expiry keeps ticking over on later prompt cycles.
fn settle(session: &mut PosSession<SystemClock>) -> Result<()> {
    loop {
        let Some(due) = session.next_timer_due() else {
            return Ok(());
        };
        let wait = (due - chrono::Utc::now()).to_std().unwrap_or(Duration::ZERO);
        std::thread::sleep(wait);
        let outcomes = session.tick()?;
        print_outcomes(&outcomes);
        if outcomes
            .iter()
            .any(|o| !matches!(o, SessionOutcome::BannerCleared))
        {
            return Ok(());
        }
    }
}

fn drain_due(session: &mut PosSession<SystemClock>) -> Result<()> {
    let outcomes = session.tick()?;
    print_outcomes(&outcomes);
    Ok(())
}

fn print_outcomes(outcomes: &[SessionOutcome]) {
    for outcome in outcomes {
        match outcome {
            SessionOutcome::ProductScanned { product } => {
                println!("scanned: {} ({})", product.name, money::format_usd(product.price));
            }
            SessionOutcome::ProductNotFound { code } => {
                println!("Product not found with barcode: {code}");
            }
            SessionOutcome::PaymentSettled { order_number } => {
                println!("Order #{order_number} Complete!");
            }
            SessionOutcome::BannerCleared => {}
        }
    }
}
