// ==========================================
// 农产品贸易参考数据核心 - 配置层
// ==========================================
// 职责: 应用配置管理 (数据库路径/种子目录/日志过滤器)
// 存储: JSON 配置文件, 缺省值兜底
// ==========================================

pub mod app_config;

// 重导出核心配置类型
pub use app_config::AppConfig;
