#[tokio::main]
async fn main() -> anyhow::Result<()> {
    emporium::cli::run().await
}
