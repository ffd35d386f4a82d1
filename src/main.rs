use anyhow::Result;
use exam_auto_grader::orchestrator::App;
use exam_auto_grader::utils::logging;
use exam_auto_grader::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
