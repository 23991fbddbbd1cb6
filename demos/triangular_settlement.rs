//! Triangular settlement example.
//!
//! A owes B and B owes C the same amount. Netting global balances first
//! collapses two payments into one.

use rust_decimal_macros::dec;
use split_ledger::prelude::*;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("╔════════════════════════════════════════════╗");
    println!("║  split-ledger: Triangular Settlement       ║");
    println!("╚════════════════════════════════════════════╝\n");

    let a = MemberId::new("A");
    let b = MemberId::new("B");
    let c = MemberId::new("C");

    println!("History:");
    println!("  B paid 30 for A's lunch  (A owes B 30)");
    println!("  C paid 30 for B's taxi   (B owes C 30)\n");

    let snapshot = LedgerSnapshot::new("triangle")
        .with_member(Member::named("A"))
        .with_member(Member::named("B"))
        .with_member(Member::named("C"))
        .with_expense(
            Expense::new("lunch", dec!(30))?
                .paid_by(b.clone(), dec!(30))
                .split(a.clone(), dec!(30)),
        )
        .with_expense(
            Expense::new("taxi", dec!(30))?
                .paid_by(c.clone(), dec!(30))
                .split(b.clone(), dec!(30)),
        );

    println!("━━━ Pairwise view (two separate debts) ━━━\n");
    print!("{}", compute_pairwise_debts(&snapshot, 2));

    println!("\n━━━ Global view ━━━\n");
    print!("{}", compute_nets(&snapshot, 2));

    println!();
    let plan = suggest_settlements(&snapshot, 2);
    print!("{}", plan);
    println!(
        "\n{} transfer(s) instead of 2: B's balance is already zero.",
        plan.len()
    );
    Ok(())
}
