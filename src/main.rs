use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = budget_update::args::parse();
    budget_update::cli::main(args).await
}
