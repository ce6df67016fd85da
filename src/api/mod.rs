// ==========================================
// 农产品贸易参考数据核心 - API 层
// ==========================================
// 职责: 提供面向 ETL 管道的组合接口
// ==========================================

pub mod error;
pub mod standardize_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use standardize_api::{RawTradeRecord, StandardizeApi, StandardizedRecord};
