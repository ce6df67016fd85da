// ==========================================
// 农产品贸易参考数据核心 - 导入层
// ==========================================
// 职责: 外部种子数据导入, 经仓储幂等 upsert 装载参考数据
// 支持: CSV
// ==========================================

// 模块声明
pub mod error;
pub mod seed_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use seed_importer::{ImportSummary, SeedImporter};
