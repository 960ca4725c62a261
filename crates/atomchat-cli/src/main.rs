#[tokio::main]
async fn main() -> anyhow::Result<()> {
    atomchat_cli::run().await
}
