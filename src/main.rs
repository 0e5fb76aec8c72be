mod cli;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use cameo::config::CameoConfig;
use cameo::controller::{ContinuationPolicy, LoadOutcome};
use cameo::scroll::Visibility;
use cameo::signing::EnvCredentials;
use cameo::Cameo;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cameo=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = CameoConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(proxy) = cli.proxy { cfg.proxy_url = proxy; }
    let policy = if cli.use_total { ContinuationPolicy::UpstreamTotal } else { ContinuationPolicy::PageSizeHeuristic };

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind { cfg.bind = bind; }
            cameo::proxy::serve(&cfg, Arc::new(EnvCredentials)).await?;
        }
        Commands::List { pages } => {
            let app = Cameo::with_policy(cfg, policy)?;
            if app.start().await == LoadOutcome::Failed {
                eprintln!("Could not load characters; is the proxy running?");
            }
            for _ in 1..pages {
                match app.load_more().await {
                    Some(LoadOutcome::Applied { .. }) => {}
                    _ => break,
                }
            }
            print!("{}", app.grid());
        }
        Commands::Search { term } => {
            let app = Cameo::with_policy(cfg, policy)?;
            app.search(&term).await;
            print!("{}", app.grid());
        }
        Commands::Browse => browse(Cameo::with_policy(cfg, policy)?).await?,
        Commands::Show { name } => {
            let mut app = Cameo::with_policy(cfg, policy)?;
            app.search(&name).await;
            let items = app.controller().items();
            let pos = items
                .iter()
                .position(|i| i.name.eq_ignore_ascii_case(name.trim()))
                .unwrap_or(0);
            if app.select(pos).is_none() {
                bail!("no character found for '{}'", name);
            }
            if let Some(view) = app.detail() {
                print!("{view}");
            }
        }
    }
    Ok(())
}

async fn browse(mut app: Cameo) -> Result<()> {
    app.start().await;
    print!("{}", app.grid());
    let trigger = app.scroll_trigger();
    let debouncer = app.debouncer();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading input")? {
        match line.trim() {
            ":quit" => break,
            ":more" => {
                trigger.notify(Visibility::Visible);
                trigger.notify(Visibility::Hidden);
            }
            ":show" => print!("{}", app.grid()),
            ":close" => app.close_detail(),
            cmd if cmd.starts_with(":open") => {
                let pos = cmd[":open".len()..].trim().parse::<usize>().ok();
                match pos.and_then(|p| app.select(p).map(|_| ())) {
                    Some(()) => {
                        if let Some(view) = app.detail() { print!("{view}"); }
                    }
                    None => eprintln!("usage: :open <position in the list>"),
                }
            }
            _ => debouncer.input(&line),
        }
    }
    trigger.detach();
    Ok(())
}
