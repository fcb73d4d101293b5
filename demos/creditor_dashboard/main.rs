//! Creditor dashboard demo
//!
//! Serves the three built-in views over seeded in-memory data for two
//! creditor companies. Pass a YAML file path as the first argument to
//! override view defaults or the server address.
//!
//! ```text
//! cargo run --example creditor_dashboard -- desk.yaml
//! curl -H "x-user-id: <uuid>" -H "x-tenant-id: <tenant>" localhost:3000/views/payments/rows
//! ```

use anyhow::Result;
use chrono::{Duration, Utc};
use creditdesk::prelude::*;
use tracing_subscriber::EnvFilter;

const CONSUMERS: [&str; 8] = [
    "Ada Lovelace",
    "Grace Hopper",
    "Alan Turing",
    "Barbara Liskov",
    "Edsger Dijkstra",
    "Frances Allen",
    "Donald Knuth",
    "Margaret Hamilton",
];

struct Seed {
    negotiations: InMemoryRecordSource<NegotiationRow>,
    payments: InMemoryRecordSource<PaymentRow>,
    disputes: InMemoryRecordSource<DisputeRow>,
}

fn seed(tenants: &[Uuid]) -> Result<Seed> {
    let seed = Seed {
        negotiations: InMemoryRecordSource::new(),
        payments: InMemoryRecordSource::new(),
        disputes: InMemoryRecordSource::new(),
    };
    let today = Utc::now().date_naive();

    for (t, tenant) in tenants.iter().enumerate() {
        for (i, consumer) in CONSUMERS.iter().enumerate() {
            let n = (t * CONSUMERS.len() + i) as i64;
            let account = format!("ACC-{:05}", 10_000 + n);
            let balance = 250.0 + 137.5 * n as f64;

            seed.negotiations.insert(NegotiationRow::new(
                *tenant,
                if i % 3 == 0 { "countered" } else { "pending" }.to_string(),
                consumer.to_string(),
                account.clone(),
                balance * 0.6,
                balance,
                if i % 2 == 0 { "settlement" } else { "installment" }.to_string(),
                today - Duration::days(n),
            ))?;
            seed.payments.insert(PaymentRow::new(
                *tenant,
                if i % 4 == 0 { "failed" } else { "paid" }.to_string(),
                consumer.to_string(),
                account.clone(),
                balance / 4.0,
                if i % 2 == 0 { "card" } else { "ach" }.to_string(),
                today - Duration::days(2 * n),
                (i % 4 != 0).then(|| today - Duration::days(2 * n - 1)),
            ))?;
            if i % 3 == 1 {
                seed.disputes.insert(DisputeRow::new(
                    *tenant,
                    "open".to_string(),
                    consumer.to_string(),
                    account,
                    "balance disputed".to_string(),
                    balance,
                    today - Duration::days(n),
                ))?;
            }
        }
    }
    Ok(seed)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => DeskConfig::from_yaml_file(&path)?,
        None => DeskConfig::default(),
    };
    let addr = config.server.socket_addr()?.to_string();

    let tenants = [Uuid::new_v4(), Uuid::new_v4()];
    let seed = seed(&tenants)?;

    println!("🚀 Creditor dashboard on http://{}", addr);
    for tenant in &tenants {
        println!("🏢 Tenant: {}", tenant);
    }
    println!("👤 Any user id works, e.g. {}", Uuid::new_v4());
    println!("\n📚 Routes:");
    println!("  GET  /views");
    println!("  GET  /views/{{view}}/rows?page&limit&search&sort&direction&status&from&to");
    println!("  POST /views/{{view}}/sort/{{column}}");
    println!("  GET  /views/{{view}}/export");
    println!("  GET  /reports/history");
    println!("  GET  /reports/history/{{id}}/download");

    ServerBuilder::new()
        .with_config(config)
        .register_view(open_negotiations_view(), seed.negotiations)
        .register_view(payments_view(), seed.payments)
        .register_view(disputes_view(), seed.disputes)
        .serve(&addr)
        .await
}
