// ==========================================
// 农产品贸易参考数据核心 - API 层错误类型
// ==========================================
// 职责: 定义 API 层错误类型, 转换解析器错误为调用方友好的错误
// 工具: thiserror 派生宏
// ==========================================

use crate::engine::ResolverError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    ResolverError(#[from] ResolverError),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
