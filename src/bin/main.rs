//! Binary entrypoint for the narrator client

#[tokio::main]
async fn main() {
    if let Err(e) = narrator_client::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
