use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = ceno_proxy::cli::Cli::parse();
    if let Err(e) = ceno_proxy::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
