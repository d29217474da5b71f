//! churn-runner: headless driver for a Churn Desk session.
//!
//! Usage:
//!   churn-runner --config data/session.json
//!   churn-runner --base-url http://127.0.0.1:8000 --profile customer.json
//!   churn-runner --offline --seed 42 --ipc-mode
//!
//! In IPC mode each stdin line is a JSON command and each reply is a
//! JSON session snapshot on stdout.

use anyhow::Result;
use churn_desk_core::{
    command::SessionCommand,
    config::SessionConfig,
    gateway::{HttpGateway, PredictionGateway, SeededGateway},
    profile::CustomerProfile,
    resolver,
    workflow::Workflow,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Command { command: SessionCommand },
    Quit,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let offline = args.iter().any(|a| a == "--offline");

    let mut config = match flag_value(&args, "--config") {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(url) = flag_value(&args, "--base-url") {
        config = config.with_base_url(url);
    }

    let gateway: Box<dyn PredictionGateway> = if offline {
        Box::new(SeededGateway::new(seed))
    } else {
        Box::new(HttpGateway::new(&config.gateway)?)
    };

    if !ipc_mode {
        println!("Churn Desk - churn-runner");
        println!("  gateway:   {}", gateway.name());
        if offline {
            println!("  seed:      {seed}");
        } else {
            println!("  base_url:  {}", config.gateway.base_url);
        }
        println!();
    }

    let mut workflow = match flag_value(&args, "--profile") {
        Some(path) => Workflow::with_profile(config, load_profile(path)?)?,
        None => Workflow::new(config),
    };

    if ipc_mode {
        run_ipc_loop(&mut workflow, gateway.as_ref()).await?;
    } else {
        run_once(&mut workflow, gateway.as_ref()).await?;
    }

    Ok(())
}

async fn run_ipc_loop(workflow: &mut Workflow, gateway: &dyn PredictionGateway) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = stdin.lock().read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                writeln!(stdout, "{}", serde_json::to_string(&workflow.snapshot())?)?;
            }
            IpcCommand::Command { command } => {
                let name = command.name();
                match workflow.execute(command, gateway).await {
                    Ok(()) => {
                        writeln!(stdout, "{}", serde_json::to_string(&workflow.snapshot())?)?;
                    }
                    Err(e) => {
                        log::warn!("{name} failed: {e}");
                        let reply = serde_json::json!({
                            "error": e.to_string(),
                            "state": workflow.snapshot(),
                        });
                        writeln!(stdout, "{}", reply)?;
                    }
                }
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

async fn run_once(workflow: &mut Workflow, gateway: &dyn PredictionGateway) -> Result<()> {
    if let Err(e) = workflow.submit(gateway).await {
        anyhow::bail!("Prediction failed: {e}");
    }
    print_summary(workflow);
    Ok(())
}

fn load_profile(path: &str) -> Result<CustomerProfile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    let profile: CustomerProfile = serde_json::from_str(&content)?;
    let normalized = resolver::normalize(&profile);
    let changed = profile.diff(&normalized);
    if !changed.is_empty() {
        log::warn!("{path}: normalized dependent fields {changed:?}");
    }
    Ok(normalized)
}

fn print_summary(workflow: &Workflow) {
    let snapshot = workflow.snapshot();

    println!("=== PREDICTION ===");
    if let Some(p) = &snapshot.current_prediction {
        println!("  probability:  {:.1}%", p.probability_percent());
        println!("  status:       {}", snapshot.status_label);
    }

    println!();
    println!("=== TOP DRIVERS ===");
    if snapshot.drivers.is_empty() {
        println!("  (none reported)");
    }
    for d in &snapshot.drivers {
        let direction = if d.increases_risk() { "raises" } else { "lowers" };
        println!("  {:<18} {:<28} {direction} risk by {:.3}", d.feature, d.value.to_string(), d.impact.abs());
    }

    let a = &snapshot.analytics;
    println!();
    println!("=== SESSION ===");
    println!("  predictions:  {}", a.total_predictions);
    println!("  churn rate:   {:.1}%", a.churn_rate * 100.0);
    println!("  avg prob:     {:.1}%", a.avg_probability * 100.0);
    println!("  high risk:    {}", a.high_risk_count);
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
