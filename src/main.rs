#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = codetrack_rust::run().await {
        eprintln!("codetrack-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
