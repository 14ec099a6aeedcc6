use anyhow::Result;
use tracing::error;

use spx_receive_audit::utils::logging;
use spx_receive_audit::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();
    logging::init(config.verbose_logging);

    if let Err(e) = logging::append_run_header(&config.output_log_file) {
        error!("写入运行日志文件失败: {}", e);
    }

    let app = App::initialize(config).await?;
    app.run().await?;
    Ok(())
}
