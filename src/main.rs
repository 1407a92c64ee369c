use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = suture_transport::cli::Cli::parse();
    if let Err(e) = suture_transport::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
