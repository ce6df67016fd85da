// ==========================================
// 农产品贸易参考数据核心 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 农产品市场数据仓库的参考数据解析内核
//           (单位换算 / 市场年度 / 历史国家代码)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 参考数据装载与查询
pub mod repository;

// 引擎层 - 解析器与快照
pub mod engine;

// 导入层 - 种子数据
pub mod importer;

// 配置层 - 应用配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - ETL 组合接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{FlowDirection, LabelFormat, SourceUnit};

// 领域实体
pub use domain::{
    ConversionRule, ConvertedQuantity, CountryMapping, CountryResolution, MarketingYear,
    MarketingYearDefinition, DEFAULT_MY_START_MONTH,
};

// 引擎
pub use engine::{
    load_reference_snapshot, ConversionResolver, CountryResolver, MarketingYearResolver,
    ReferenceSnapshot, ReferenceSnapshotBuilder, ResolverError, ResolverResult, SnapshotError,
};

// 仓储
pub use repository::{
    ConversionRuleRepository, CountryMappingRepository, MarketingYearRepository, RepositoryError,
    RepositoryResult,
};

// 导入
pub use importer::{ImportError, ImportResult, ImportSummary, SeedImporter};

// API
pub use api::{ApiError, ApiResult, RawTradeRecord, StandardizeApi, StandardizedRecord};

// 配置
pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "农产品贸易参考数据核心";
