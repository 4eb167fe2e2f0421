#[tokio::main]
async fn main() -> anyhow::Result<()> {
    srs_backend::run().await
}
