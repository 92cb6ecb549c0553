use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    llm_qa::run_web().await
}
