//! PharmAssist operator shell.
//!
//! Reads one command per line from stdin:
//!
//! ```text
//! process <image-path>   extract a prescription and show availability
//! sell <name|||qty|N>    sell a selection token, or the Nth listed option
//! reset                  clear the view and reload inventory
//! inventory              show the full inventory
//! order                  print the held prescription as JSON
//! tables                 list store tables and their columns
//! quit
//! ```

use std::io::{self, BufRead, Write};

use anyhow::Context;
use pharm_assist_core::engine::{INVENTORY_HEADERS, PRESCRIPTION_HEADERS};
use pharm_assist_core::{
    ActionOutcome, Config, Database, DrugRecord, ReconciliationEngine, SellOption, Session,
    TableRow,
};
use pharm_assist_llm::{GeminiClient, PrescriptionImage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pharm_assist_core=info,pharm_assist_llm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env()?;
    tracing::info!(store = %config.database_path.display(), "starting PharmAssist");

    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open store {}", config.database_path.display()))?;
    let client = GeminiClient::new(config.api_key.clone(), config.gemini_model.clone())?;
    tracing::info!(model = client.model(), "vision model configured");

    let engine = ReconciliationEngine::new(&db, &client);
    let mut session = Session::new();
    let mut options: Vec<SellOption> = Vec::new();

    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let (command, arg) = match line.trim().split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (line.trim(), ""),
        };

        match command {
            "" => {}
            "process" => match std::fs::read(arg) {
                Ok(bytes) => {
                    let image = PrescriptionImage::from_bytes(bytes);
                    let outcome = engine.extract_and_reconcile(&mut session, &image);
                    render_outcome(&outcome, &mut options);
                }
                Err(e) => println!("cannot read {}: {}", arg, e),
            },
            "sell" => {
                let token = match arg.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= options.len() => options[n - 1].value.clone(),
                    _ => arg.to_string(),
                };
                let outcome = engine.sell(&session, &token);
                render_outcome(&outcome, &mut options);
            }
            "reset" => {
                let outcome = engine.reset();
                options.clear();
                println!("{}", outcome.status);
                render_inventory(&outcome.inventory);
            }
            "inventory" | "tables" | "order" => {
                if let Err(e) = show(&db, &session, command) {
                    tracing::error!(command, error = %e, "command failed");
                    println!("❌ {}", e);
                }
            }
            "quit" | "exit" => break,
            other => println!("unknown command: {}", other),
        }
        prompt()?;
    }

    Ok(())
}

/// Read-only views. Failures are reported to the operator, never fatal.
fn show(db: &Database, session: &Session, command: &str) -> anyhow::Result<()> {
    match command {
        "inventory" => render_inventory(&db.list_all_drugs()?),
        "tables" => {
            for table in db.list_tables()? {
                let columns: Vec<String> = db
                    .describe_table(&table)?
                    .into_iter()
                    .map(|(name, ty)| format!("{} {}", name, ty))
                    .collect();
                println!("{}({})", table, columns.join(", "));
            }
        }
        "order" => match session.order() {
            Some(order) => println!("{}", serde_json::to_string_pretty(order)?),
            None => println!("no prescription processed yet"),
        },
        other => anyhow::bail!("unknown view: {}", other),
    }
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

fn render_outcome(outcome: &ActionOutcome, options: &mut Vec<SellOption>) {
    if let Some(table) = &outcome.table {
        render_prescription(table);
    }
    if let Some(sell_options) = &outcome.sell_options {
        *options = sell_options.clone();
        for (i, option) in options.iter().enumerate() {
            println!("  [{}] {}", i + 1, option.label);
        }
    }
    let status = outcome.status.to_string();
    if !status.is_empty() {
        println!("{}", status);
    }
    if let Some(inventory) = &outcome.inventory {
        render_inventory(inventory);
    }
}

fn render_prescription(rows: &[TableRow]) {
    println!("{}", PRESCRIPTION_HEADERS.join(" | "));
    for row in rows {
        println!("{}", row.cells().join(" | "));
    }
}

fn render_inventory(drugs: &[DrugRecord]) {
    println!("{}", INVENTORY_HEADERS.join(" | "));
    for drug in drugs {
        println!(
            "{} | {} | {} | {} | {}",
            drug.name,
            drug.brand.as_deref().unwrap_or(""),
            drug.quantity,
            drug.expiry_date.as_deref().unwrap_or(""),
            drug.price_per_unit
                .map(|p| format!("{:.2}", p))
                .unwrap_or_default(),
        );
    }
}
