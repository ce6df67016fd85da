// ==========================================
// 农产品贸易参考数据核心 - 应用配置
// ==========================================
// 职责: 配置加载与缺省值管理
// 格式: JSON (serde_json), 字段缺省逐项兜底
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 缺省数据库文件路径
pub const DEFAULT_DB_PATH: &str = "ag_trade_ref.db";
/// 缺省种子数据目录
pub const DEFAULT_SEED_DIR: &str = "seeds";
/// 缺省日志过滤器
pub const DEFAULT_LOG_FILTER: &str = "info";

// ==========================================
// AppConfig - 应用配置
// ==========================================

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 参考数据库文件路径
    pub db_path: String,
    /// 种子数据目录
    pub seed_dir: String,
    /// 日志过滤器 (RUST_LOG 语法)
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            seed_dir: DEFAULT_SEED_DIR.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    ///
    /// # 规则
    /// - 文件不存在 → 返回缺省配置 (不视为错误)
    /// - 文件存在但解析失败 → 上抛错误
    /// - 缺失字段逐项取缺省值
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "配置文件不存在, 使用缺省配置");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(config.seed_dir, DEFAULT_SEED_DIR);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_partial_json_falls_back_per_field() {
        let config: AppConfig = serde_json::from_str(r#"{"db_path": "/tmp/ref.db"}"#).unwrap();
        assert_eq!(config.db_path, "/tmp/ref.db");
        assert_eq!(config.seed_dir, DEFAULT_SEED_DIR);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let config = AppConfig::load_from_file(Path::new("/nonexistent/app_config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
