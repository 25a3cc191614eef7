use anyhow::Result;
use rank_question_submit::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    let summary = App::initialize(config).await?.run().await?;

    if !summary.success {
        std::process::exit(1);
    }

    Ok(())
}
