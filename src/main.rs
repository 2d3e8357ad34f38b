// src/main.rs

use agent_collab::{cli, config_log_level, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("agent-collab error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let config_level = config_log_level(&args);
    logging::init_logging(args.log_level, config_level.as_deref())?;
    run(args).await
}
