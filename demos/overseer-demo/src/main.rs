//! Overseer demo CLI.
//!
//! Wires an in-memory `Basis` with the built-in demo plugins registered,
//! then either lists its commands (`init`) or dispatches one (anything
//! else).
//!
//! # Usage
//!
//! ```bash
//! overseer-demo init
//! overseer-demo echo hello world
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use overseer_basis::{Basis, BasisOptions, JobInfo, Task};
use overseer_persistence::InMemoryClient;
use overseer_system::{ConsoleUi, FactoryRegistry};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter("overseer=info").try_init().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: overseer-demo <init | command words...>");
        std::process::exit(1);
    }

    let mut factories = FactoryRegistry::new();
    overseer_plugins::register_demo_plugins(&mut factories);

    let basis = Basis::construct(BasisOptions {
        name: Some("overseer-demo".to_string()),
        data_dir: Some(PathBuf::from("/tmp/overseer-demo")),
        client: Some(Arc::new(InMemoryClient::new())),
        factories: Some(Arc::new(factories)),
        ..Default::default()
    })
    .await
    .unwrap_or_else(|err| {
        eprintln!("failed to construct basis: {err}");
        std::process::exit(1);
    });

    if args[0] == "init" {
        match basis.init().await {
            Ok(records) => {
                for record in records {
                    println!("{} — {}", record.name, record.synopsis);
                }
            }
            Err(err) => eprintln!("init failed: {err}"),
        }
    } else {
        let job = JobInfo::new("demo-job", Arc::new(ConsoleUi));
        match basis.run(Task::new(args), job).await {
            Ok(code) => println!("exited {code}"),
            Err(err) => eprintln!("run failed: {err}"),
        }
    }

    if let Some(failures) = basis.close().await {
        eprintln!("close reported {} error(s): {failures}", failures.len());
    }
}
