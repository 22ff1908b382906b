use linkvault::config::StaticConfig;
use linkvault::runtime;
use linkvault::system::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match StaticConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    // guard 必须存活到进程结束，否则缓冲日志会丢失
    let _guard = init_logging(&config.logging);

    runtime::run(config).await
}
