// ==========================================
// 农产品贸易参考数据核心 - 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 过滤器优先级: RUST_LOG 环境变量 > 配置文件 log_filter > "info"
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志系统 (缺省过滤器 "info")
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器, 优先于任何配置值
///   例如: RUST_LOG=debug 或 RUST_LOG=ag_trade_ref=trace
pub fn init() {
    init_with_filter("info");
}

/// 以配置文件给定的过滤器初始化日志系统
///
/// # 参数
/// - default_filter: 配置文件中的 log_filter (RUST_LOG 语法)
///
/// # 规则
/// - RUST_LOG 已设置且非空 → 环境变量优先
/// - 否则使用 default_filter
pub fn init_with_filter(default_filter: &str) {
    let filter = resolve_filter(std::env::var("RUST_LOG").ok(), default_filter);

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别, 便于调试; 可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// 解析生效的日志过滤器 (环境变量优先, 配置值兜底)
fn resolve_filter(env_value: Option<String>, default_filter: &str) -> EnvFilter {
    match env_value {
        Some(v) if !v.is_empty() => EnvFilter::new(v),
        _ => EnvFilter::new(default_filter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_wins_over_config_filter() {
        let filter = resolve_filter(Some("trace".to_string()), "info");
        assert_eq!(filter.to_string(), "trace");
    }

    #[test]
    fn test_config_filter_used_when_env_missing() {
        let filter = resolve_filter(None, "ag_trade_ref=debug");
        assert_eq!(filter.to_string(), "ag_trade_ref=debug");
    }

    #[test]
    fn test_empty_env_var_falls_back_to_config() {
        let filter = resolve_filter(Some(String::new()), "warn");
        assert_eq!(filter.to_string(), "warn");
    }
}
