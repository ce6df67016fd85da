// ==========================================
// 农产品贸易参考数据核心 - 种子装载主入口
// ==========================================
// 技术栈: Rust + SQLite
// 用途: 初始化参考数据库, 导入种子 CSV, 装载一次快照自检
// ==========================================

use ag_trade_ref::config::AppConfig;
use ag_trade_ref::db;
use ag_trade_ref::engine::load_reference_snapshot;
use ag_trade_ref::importer::SeedImporter;
use ag_trade_ref::repository::{
    ConversionRuleRepository, CountryMappingRepository, MarketingYearRepository,
};
use anyhow::Context;
use std::path::Path;
use std::sync::{Arc, Mutex};

fn main() -> anyhow::Result<()> {
    // 加载配置 (可选的 app_config.json, 缺省值兜底)
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "app_config.json".to_string());
    let config = AppConfig::load_from_file(Path::new(&config_path))
        .with_context(|| format!("配置加载失败: {}", config_path))?;

    // 初始化日志系统 (RUST_LOG 优先, 配置 log_filter 兜底)
    ag_trade_ref::logging::init_with_filter(&config.log_filter);

    tracing::info!("==================================================");
    tracing::info!("{}", ag_trade_ref::APP_NAME);
    tracing::info!("系统版本: {}", ag_trade_ref::VERSION);
    tracing::info!("==================================================");
    tracing::info!("使用数据库: {}", config.db_path);
    tracing::info!("种子目录: {}", config.seed_dir);

    // 打开数据库并初始化表结构 (幂等)
    let conn = db::open_sqlite_connection(&config.db_path)
        .with_context(|| format!("无法打开数据库: {}", config.db_path))?;
    db::init_schema(&conn).context("表结构初始化失败")?;

    if let Some(version) = db::read_schema_version(&conn)? {
        if version != db::CURRENT_SCHEMA_VERSION {
            tracing::warn!(
                found = version,
                expected = db::CURRENT_SCHEMA_VERSION,
                "schema_version 与当前代码不一致"
            );
        }
    }

    let conn = Arc::new(Mutex::new(conn));
    let conversion_repo = ConversionRuleRepository::from_connection(conn.clone());
    let marketing_year_repo = MarketingYearRepository::from_connection(conn.clone());
    let country_repo = CountryMappingRepository::from_connection(conn);

    // 导入种子数据 (幂等, 可任意次重放)
    let importer = SeedImporter::new(&conversion_repo, &marketing_year_repo, &country_repo);
    let summary = importer
        .import_all(Path::new(&config.seed_dir))
        .context("种子数据导入失败")?;
    tracing::info!(
        conversion_rules = summary.conversion_rules,
        marketing_years = summary.marketing_years,
        country_mappings = summary.country_mappings,
        "种子数据导入统计"
    );

    // 装载一次快照自检 (同时校验参考数据不变式)
    let snapshot = load_reference_snapshot(&conversion_repo, &marketing_year_repo, &country_repo)
        .context("快照装载失败")?;
    let (rules, years, mappings) = snapshot.table_counts();
    tracing::info!(
        snapshot_id = %snapshot.snapshot_id,
        rules,
        years,
        mappings,
        "参考数据快照自检通过"
    );

    Ok(())
}
