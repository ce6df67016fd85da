// ==========================================
// 农产品贸易参考数据核心 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供参考数据表的装载与查询接口, 屏蔽数据库细节
// 约束: 所有查询使用参数化, 防止 SQL 注入
// 约束: 参考数据只经离线种子/迁移路径写入, ETL 事务路径只读
// ==========================================

pub mod conversion_repo;
pub mod country_repo;
pub mod error;
pub mod marketing_year_repo;

// 重导出核心仓储
pub use conversion_repo::ConversionRuleRepository;
pub use country_repo::CountryMappingRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use marketing_year_repo::MarketingYearRepository;
