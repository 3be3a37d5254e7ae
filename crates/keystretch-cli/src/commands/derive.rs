use std::io::{self, BufRead, IsTerminal};
use std::thread::sleep;
use std::time::{Duration, Instant};

use chrono::Utc;
use dialoguer::Password;
use keystretch_core::kdf::generate_salt;
use keystretch_core::{Dispatcher, JobController, JobStatus, KdfCost, KdfParameters};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::cli::{Cli, DeriveArgs};
use crate::config::{load_config, resolve_config_path};
use crate::errors::CliError;
use crate::output::DerivedOutput;
use crate::progress::DeriveProgress;

pub fn handle_derive(cli: &Cli, args: &DeriveArgs) -> anyhow::Result<()> {
    let config = load_config(&resolve_config_path(cli)?)?;
    let cost = apply_cost_overrides(config.kdf, args);
    cost.validate().map_err(|e| CliError::invalid_input(e.to_string()))?;

    let salt = match args.salt_hex.as_deref() {
        Some(value) => hex::decode(value.trim())
            .map_err(|e| CliError::invalid_input(format!("Invalid --salt-hex: {}", e)))?,
        None => generate_salt()?.to_vec(),
    };
    let passphrase = read_passphrase(args.passphrase_stdin)?;
    let build_params = || {
        KdfParameters::new(passphrase.as_str(), &salt, cost)
            .map_err(|e| CliError::invalid_input(e.to_string()))
    };

    let dispatcher = Dispatcher::spawn(JobController::with_argon2())?;
    let started = Instant::now();
    dispatcher.start(build_params()?)?;
    info!(?cost, "derivation requested");

    let poll_interval = Duration::from_millis(config.ui.poll_interval_ms.max(1));
    let restart_after = args.restart_after_ms.map(Duration::from_millis);
    let timeout = args.timeout_secs.map(Duration::from_secs);
    let progress = DeriveProgress::new(!cli.quiet && !args.json);
    let mut restarted = false;

    let status: JobStatus = loop {
        let status = dispatcher.status()?;
        progress.update(status.progress);
        if !status.is_running {
            break status;
        }

        let elapsed = started.elapsed();
        if let Some(limit) = timeout {
            if elapsed >= limit {
                dispatcher.terminate()?;
                progress.abandon("Terminated");
                return Err(CliError::TimedOut {
                    seconds: limit.as_secs(),
                }
                .into());
            }
        }
        if let Some(after) = restart_after {
            if !restarted && elapsed >= after {
                debug!(elapsed_ms = elapsed.as_millis() as u64, "restarting derivation");
                dispatcher.start(build_params()?)?;
                progress.restarted();
                restarted = true;
            }
        }
        sleep(poll_interval);
    };
    progress.finish();

    if status.has_error {
        return Err(CliError::out_of_memory(cost.memory_kib).into());
    }
    let result = dispatcher
        .result()?
        .ok_or_else(|| anyhow::anyhow!("Derivation finished without a result"))?;
    dispatcher.shutdown();

    let output = DerivedOutput::new(&result, started.elapsed(), Utc::now());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&output.to_json())?);
    } else if cli.quiet {
        println!("{}", output.key_base64.as_str());
    } else {
        println!("{}", output.to_text());
    }
    Ok(())
}

fn apply_cost_overrides(base: KdfCost, args: &DeriveArgs) -> KdfCost {
    KdfCost {
        memory_kib: args.memory_kib.unwrap_or(base.memory_kib),
        iterations: args.iterations.unwrap_or(base.iterations),
        lanes: args.lanes.unwrap_or(base.lanes),
        rounds: args.rounds.unwrap_or(base.rounds),
    }
}

fn read_passphrase(from_stdin: bool) -> anyhow::Result<Zeroizing<String>> {
    if from_stdin {
        let mut line = Zeroizing::new(String::new());
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| anyhow::anyhow!("Failed to read passphrase from stdin: {}", e))?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        return Ok(Zeroizing::new(trimmed.to_string()));
    }

    if !io::stdin().is_terminal() {
        return Err(CliError::invalid_input(
            "No passphrase provided\nHint: pass --passphrase-stdin when piping input.",
        )
        .into());
    }

    let passphrase = Password::new()
        .with_prompt("Passphrase")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))?;
    Ok(Zeroizing::new(passphrase))
}
