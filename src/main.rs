//! split-ledger CLI
//!
//! Compute balances and settlements for a shared-expense group stored as
//! JSON.
//!
//! # Usage
//!
//! ```bash
//! # Net balance of every member
//! split-ledger balances --input group.json
//!
//! # Suggested transfers, as JSON
//! split-ledger settle --input group.json --format json
//!
//! # Who owes whom, and the breakdown for one member
//! split-ledger pairwise --input group.json --member alice
//!
//! # Generate a random group for testing
//! split-ledger generate --members 5 --expenses 20
//! ```

use log::{debug, info};
use serde::Serialize;
use split_ledger::core::member::MemberId;
use split_ledger::core::money::unit;
use split_ledger::core::snapshot::LedgerSnapshot;
use split_ledger::engine::pairwise::DebtDirection;
use split_ledger::engine::{EngineConfig, SettlementEngine};
use split_ledger::simulation::generator::{generate_random_ledger, LedgerConfig};
use std::fmt::Display;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"split-ledger — balances and settlements for shared-expense groups

USAGE:
    split-ledger <COMMAND> [OPTIONS]

COMMANDS:
    balances    Net balance of every member
    settle      Suggested transfers that settle the group
    pairwise    Directional debts between every pair of members
    generate    Generate a random group (for testing)
    help        Show this message

OPTIONS (balances, settle, pairwise):
    --input <FILE>      Path to the group JSON snapshot
    --format <FORMAT>   Output format: text (default) or json
    --precision <N>     Decimal places to round to (default: 2)
    --config <FILE>     Engine settings as JSON
    --strict            Reject unknown members and unbalanced expenses
    --member <ID>       (pairwise) Show the breakdown for one member

OPTIONS (generate):
    --members <N>       Number of members (default: 6)
    --expenses <N>      Number of expenses (default: 30)
    --settlements <N>   Number of settlements (default: 5)
    --output <FILE>     Write to file instead of stdout

ENVIRONMENT:
    RUST_LOG            Log filter, e.g. RUST_LOG=debug

EXAMPLES:
    split-ledger balances --input trip.json
    split-ledger settle --input trip.json --format json
    split-ledger pairwise --input trip.json --member alice
    split-ledger generate --members 4 --expenses 10 --output trip.json"#
    );
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Options shared by the computing commands.
struct QueryOptions {
    input: String,
    json: bool,
    config: EngineConfig,
    member: Option<MemberId>,
}

fn next_value(args: &[String], i: &mut usize, flag: &str, what: &str) -> String {
    *i += 1;
    args.get(*i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires {}", flag, what)))
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    value
        .parse()
        .unwrap_or_else(|_| fail(format!("{} requires a number, got '{}'", flag, value)))
}

fn parse_query_options(args: &[String]) -> QueryOptions {
    let mut input = None;
    let mut format = "text".to_string();
    let mut precision = None;
    let mut config_path = None;
    let mut strict = false;
    let mut member = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input = Some(next_value(args, &mut i, "--input", "a file path")),
            "--format" => format = next_value(args, &mut i, "--format", "'text' or 'json'"),
            "--precision" => {
                let value = next_value(args, &mut i, "--precision", "a number");
                precision = Some(parse_number::<u32>(&value, "--precision"));
            }
            "--config" => config_path = Some(next_value(args, &mut i, "--config", "a file path")),
            "--strict" => strict = true,
            "--member" => {
                member = Some(MemberId::new(next_value(args, &mut i, "--member", "a member id")))
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let input = input.unwrap_or_else(|| fail("--input <FILE> is required"));
    if format != "text" && format != "json" {
        fail(format!("unknown format '{}', expected 'text' or 'json'", format));
    }

    let mut config = match config_path {
        Some(path) => load_config(&path),
        None => EngineConfig::default(),
    };
    if let Some(precision) = precision {
        config.precision = precision;
    }
    if strict {
        config = config.strict();
    }
    debug!("engine config: {:?}", config);

    QueryOptions {
        input,
        json: format == "json",
        config,
        member,
    }
}

fn load_config(path: &str) -> EngineConfig {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("cannot read config '{}': {}", path, e)));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| fail(format!("invalid config '{}': {}", path, e)))
}

fn load_snapshot(path: &str) -> LedgerSnapshot {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("cannot read '{}': {}", path, e)));
    let snapshot: LedgerSnapshot = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "name": "trip",
  "members": [{{ "id": "alice", "name": "Alice" }}, {{ "id": "bob", "name": "Bob" }}],
  "expenses": [{{
    "id": "5b0d6f9e-2f4a-4d7c-9a53-3f1f6c2d9e10", "description": "dinner",
    "amount": "100", "date": "2024-03-01T19:00:00Z",
    "paidBy": {{ "alice": "100" }}, "splitBetween": {{ "alice": "50", "bob": "50" }}
  }}],
  "settlements": []
}}"#
        );
        fail(format!("invalid snapshot '{}': {}", path, e))
    });
    info!(
        "loaded '{}': {} members, {} expenses, {} settlements",
        snapshot.name(),
        snapshot.members().len(),
        snapshot.expenses().len(),
        snapshot.settlements().len()
    );
    snapshot
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("cannot encode output: {}", e)),
    }
}

fn cmd_balances(args: &[String]) {
    let opts = parse_query_options(args);
    let snapshot = load_snapshot(&opts.input);
    let engine = SettlementEngine::new(opts.config);
    let sheet = engine.compute_nets(&snapshot).unwrap_or_else(|e| fail(e));

    if opts.json {
        print_json(&sheet);
    } else {
        println!("Group: {} ({})\n", snapshot.name(), snapshot.currency());
        print!("{}", sheet);
    }
}

fn cmd_settle(args: &[String]) {
    let opts = parse_query_options(args);
    let snapshot = load_snapshot(&opts.input);
    let engine = SettlementEngine::new(opts.config);
    let plan = engine
        .suggest_settlements(&snapshot)
        .unwrap_or_else(|e| fail(e));

    if opts.json {
        print_json(&plan);
    } else {
        println!("Group: {} ({})\n", snapshot.name(), snapshot.currency());
        print!("{}", plan);
    }
}

fn cmd_pairwise(args: &[String]) {
    let opts = parse_query_options(args);
    let snapshot = load_snapshot(&opts.input);
    let engine = SettlementEngine::new(opts.config);
    let debts = engine
        .compute_pairwise_debts(&snapshot)
        .unwrap_or_else(|e| fail(e));

    let Some(member) = opts.member else {
        if opts.json {
            print_json(&debts);
        } else {
            print!("{}", debts);
        }
        return;
    };

    if !snapshot.contains_member(&member) {
        fail(format!("no member with id '{}'", member));
    }
    let lines = debts.breakdown(&member, unit(opts.config.precision));
    if opts.json {
        print_json(&lines);
        return;
    }
    println!("=== Breakdown for {} ===", member);
    if lines.is_empty() {
        println!("  Nothing owed either way.");
    }
    for line in &lines {
        match line.direction {
            DebtDirection::Owes => {
                println!("  {} owes {} {}", line.counterpart, member, line.amount)
            }
            DebtDirection::Owed => {
                println!("  {} owes {} {}", member, line.counterpart, line.amount)
            }
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = LedgerConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => {
                let value = next_value(args, &mut i, "--members", "a number");
                config.member_count = parse_number(&value, "--members");
            }
            "--expenses" => {
                let value = next_value(args, &mut i, "--expenses", "a number");
                config.expense_count = parse_number(&value, "--expenses");
            }
            "--settlements" => {
                let value = next_value(args, &mut i, "--settlements", "a number");
                config.settlement_count = parse_number(&value, "--settlements");
            }
            "--output" => output_path = Some(next_value(args, &mut i, "--output", "a file path")),
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let snapshot = generate_random_ledger(&config).unwrap_or_else(|e| fail(e));
    let json = serde_json::to_string_pretty(&snapshot)
        .unwrap_or_else(|e| fail(format!("cannot encode snapshot: {}", e)));

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| fail(format!("cannot write '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses across {} members → {}",
            snapshot.expenses().len(),
            snapshot.members().len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "settle" => cmd_settle(rest),
        "pairwise" => cmd_pairwise(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
