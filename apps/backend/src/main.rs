#[tokio::main]
async fn main() -> anyhow::Result<()> {
    spaced_review_backend::run().await
}
