//! Weekend trip example.
//!
//! Four friends share a cabin, groceries and fuel, then use the engine
//! to find out who pays whom.

use rust_decimal_macros::dec;
use split_ledger::engine::pairwise::DebtDirection;
use split_ledger::prelude::*;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("╔═══════════════════════════════════════╗");
    println!("║  split-ledger: Weekend Trip Example   ║");
    println!("╚═══════════════════════════════════════╝\n");

    let ana = MemberId::new("ana");
    let ben = MemberId::new("ben");
    let cai = MemberId::new("cai");
    let dee = MemberId::new("dee");
    let everyone = [ana.clone(), ben.clone(), cai.clone(), dee.clone()];

    let mut trip = LedgerSnapshot::new("weekend trip").with_currency(CurrencyCode::new("EUR"));
    for id in &everyone {
        trip.add_member(Member::new(id.clone(), id.as_str()));
    }

    println!("Expenses:");
    println!("  cabin      480.00  paid by ana, split by all");
    println!("  groceries   97.30  paid by ben (60) and cai (37.30), split by all");
    println!("  fuel        55.00  paid by dee, split by ana and dee\n");

    trip.add_expense(
        Expense::new("cabin", dec!(480))?
            .paid_by(ana.clone(), dec!(480))
            .split_equally(&everyone, 2)?,
    );
    trip.add_expense(
        Expense::new("groceries", dec!(97.30))?
            .paid_by(ben.clone(), dec!(60))
            .paid_by(cai.clone(), dec!(37.30))
            .split_equally(&everyone, 2)?,
    );
    trip.add_expense(
        Expense::new("fuel", dec!(55))?
            .paid_by(dee.clone(), dec!(55))
            .split_equally(&[ana.clone(), dee.clone()], 2)?,
    );

    let engine = SettlementEngine::new(EngineConfig::default().strict());

    println!("{}", engine.compute_nets(&trip)?);
    let plan = engine.suggest_settlements(&trip)?;
    println!("{}", plan);

    println!("━━━ Breakdown for ben ━━━\n");
    let debts = engine.compute_pairwise_debts(&trip)?;
    for line in debts.breakdown(&ben, dec!(0.01)) {
        match line.direction {
            DebtDirection::Owes => println!("  {} owes ben {}", line.counterpart, line.amount),
            DebtDirection::Owed => println!("  ben owes {} {}", line.counterpart, line.amount),
        }
    }

    println!("\n━━━ After applying the suggestions ━━━\n");
    let settled = trip.with_settlements(plan.into_settlements(chrono::Utc::now(), None)?);
    let sheet = engine.compute_nets(&settled)?;
    println!("Everyone settled: {}", sheet.is_settled());
    Ok(())
}
