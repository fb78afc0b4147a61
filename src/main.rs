use std::path::PathBuf;

use writing_tools::{config_store, run, ServerOptions};

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

const USAGE: &str = "Usage:\n  writing-tools [--config <dir>] [--host <host>] [--port <port>]\n  writing-tools --init-config [--config <dir>]\n  writing-tools --set-api-key <key> [--config <dir>]\n  writing-tools --delete-api-key [--config <dir>]\n\nEnvironment:\n  WRITING_TOOLS_HOST, WRITING_TOOLS_PORT, WRITING_TOOLS_API_URL, WRITING_TOOLS_MODEL,\n  WRITING_TOOLS_API_KEY / OPENAI_API_KEY, WRITING_TOOLS_LOG_DIR, WRITING_TOOLS_DISABLE_FILE_LOG=1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let config_dir = parse_arg_value(&args, "--config").map(PathBuf::from);

    if has_flag(&args, "--init-config") {
        let store = config_store(config_dir)?;
        let config = store.load().map_err(anyhow::Error::msg)?;
        store.save(&config).map_err(anyhow::Error::msg)?;
        println!("Wrote config: {}", store.config_file().display());
        return Ok(());
    }

    if let Some(key) = parse_arg_value(&args, "--set-api-key") {
        let store = config_store(config_dir)?;
        store.set_api_key(key.trim()).map_err(anyhow::Error::msg)?;
        println!("Stored API key in {}", store.config_file().display());
        return Ok(());
    }

    if has_flag(&args, "--delete-api-key") {
        let store = config_store(config_dir)?;
        store.delete_api_key().map_err(anyhow::Error::msg)?;
        println!("Removed API key from {}", store.config_file().display());
        return Ok(());
    }

    let port = match parse_arg_value(&args, "--port") {
        Some(p) => Some(
            p.parse::<u16>()
                .map_err(|e| anyhow::anyhow!("invalid --port {}: {}", p, e))?,
        ),
        None => None,
    };

    run(ServerOptions {
        config_dir,
        host: parse_arg_value(&args, "--host"),
        port,
    })
    .await
}
