mod cli;
pub mod config;
pub mod error;
pub mod http;
mod mcp;
pub mod ops;
mod prompts;
pub mod schema;
mod server;

#[tokio::main(flavor = "current_thread")] // stdio loop is sequential; calls interleave only at awaits
async fn main() -> anyhow::Result<()> {
    let cmd = cli::build_cli();
    let matches = cmd.get_matches();
    let log_level = matches.get_one::<String>("log-level").cloned();
    let version_flag = matches.get_flag("version");

    cli::init_logging(log_level.as_deref());

    if version_flag {
        println!("github-projects-mcp {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    server::run_stdio_server().await
}
