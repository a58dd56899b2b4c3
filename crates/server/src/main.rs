#[tokio::main]
async fn main() -> anyhow::Result<()> {
    glr_server::start().await
}
