// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;

use anyhow::{Context, Result};
use avis_api::Api;
use avis_app::AppState;
use avis_testkit::MemoryService;
use config::Config;
use std::env;
use std::path::PathBuf;

const DEMO_SEED: u64 = 42;
const DEMO_CLIENTS: usize = 6;
const DEMO_SENTIMENTS: usize = 14;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `avis --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        println!("{}", run_check(&config)?);
        return Ok(());
    }

    let mut state = AppState::default();
    if options.demo {
        let mut service = MemoryService::seeded(DEMO_SEED, DEMO_CLIENTS, DEMO_SENTIMENTS)?;
        return avis_tui::run_app(&mut state, &mut service);
    }

    let mut api = Api::new(config.service_base_url(), config.service_timeout()?).with_context(|| {
        format!(
            "invalid [service] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    avis_tui::run_app(&mut state, &mut api)
}

fn run_check(config: &Config) -> Result<String> {
    let api = Api::new(config.service_base_url(), config.service_timeout()?)?;
    let clients = api.list_clients()?;
    Ok(format!(
        "service reachable at {}, {} client rows",
        config.service_base_url(),
        clients.len()
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("avis (Rust)");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch against a seeded in-memory service");
    println!("  --check                  Validate config and probe the data service");
    println!("  --help                   Show this help");
}
