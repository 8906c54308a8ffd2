//! SyncSwap 多网络兑换工具
//!
//! 使用方法:
//!   cargo run -p swap_runner -- SyncSwap ETH USDC

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use config_crate::AppConfig;
use dex::RouteRequest;
use strategies::SwapRunner;
use utils::LoggerManager;

#[derive(Parser, Debug)]
#[command(name = "swap_runner")]
#[command(about = "在所有已配置网络上用每个账户执行一次 DEX 兑换")]
struct Cli {
    /// DEX 名称 (区分大小写，目前只支持 SyncSwap)
    dex_name: String,

    /// 输入代币 (ETH / USDC / USDT / WBTC)
    initial_coin: String,

    /// 输出代币
    end_coin: String,
}

impl From<Cli> for RouteRequest {
    fn from(cli: Cli) -> Self {
        Self {
            dex_name: cli.dex_name,
            input: cli.initial_coin,
            output: cli.end_coin,
        }
    }
}

fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("!!! 系统发生 PANIC !!!");
        error!("Panic 信息: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            error!("发生位置: {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = AppConfig::load()?;

    // 初始化日志系统
    let _logger = LoggerManager::init(&config.log.dir);

    setup_panic_hook();

    info!("========================================");
    info!("  SyncSwap 兑换任务启动");
    info!("========================================");
    info!("参数: {:?}", cli);

    let request = RouteRequest::from(cli);
    let runner = SwapRunner::new(config);

    match runner.run(&request).await {
        Ok(report) => {
            info!(
                "运行结束: 网络 {} | 尝试 {} | 成功 {} | 跳过 {} | 失败 {}",
                report.networks, report.attempted, report.swapped, report.skipped, report.failed
            );
        }
        Err(e) => {
            // 连接 RPC 失败终止运行
            error!("连接 RPC 节点出错: {:?}", e);
        }
    }

    Ok(())
}
