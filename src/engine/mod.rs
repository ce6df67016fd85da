// ==========================================
// 农产品贸易参考数据核心 - 引擎层
// ==========================================
// 职责: 实现三类参考数据解析器, 不拼 SQL
// 红线: Engine 不拼 SQL; 解析器只读共享不可变快照,
//       任意并发调用无锁、无共享可变状态
// ==========================================

pub mod conversion;
pub mod country;
pub mod error;
pub mod marketing_year;
pub mod snapshot;

// 重导出核心引擎
pub use conversion::ConversionResolver;
pub use country::CountryResolver;
pub use error::{ResolverError, ResolverResult, SnapshotError};
pub use marketing_year::MarketingYearResolver;
pub use snapshot::{load_reference_snapshot, ReferenceSnapshot, ReferenceSnapshotBuilder};
