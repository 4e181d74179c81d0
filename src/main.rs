use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    fwpack::cli::run().await
}
