// ==========================================
// 农产品贸易参考数据核心 - 领域模型层
// ==========================================
// 职责: 定义领域实体与基础类型
// 红线: 不含数据访问逻辑, 不含引擎逻辑
// ==========================================

pub mod conversion;
pub mod country;
pub mod marketing_year;
pub mod types;

// 重导出核心类型
pub use conversion::{ConversionRule, ConvertedQuantity};
pub use country::{CountryMapping, CountryResolution};
pub use marketing_year::{MarketingYear, MarketingYearDefinition, DEFAULT_MY_START_MONTH};
pub use types::{FlowDirection, LabelFormat, SourceUnit};
