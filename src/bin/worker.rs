#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = codetrack_rust::run_worker().await {
        eprintln!("codetrack-worker fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
