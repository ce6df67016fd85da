// ==========================================
// 农产品贸易参考数据核心 - 市场年度定义实体
// ==========================================
// 职责: 定义市场年度起始月配置及解析结果
// 约束: (country_code, commodity) 唯一; 缺省回退为 9 月起始/北半球
// ==========================================

use crate::domain::types::LabelFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 缺省市场年度起始月 (9 月, 北半球)
///
/// 该缺省值是下游聚合的隐性依赖, 必须精确保持: 无定义的
/// (国家, 商品) 组合一律按 9 月起始的跨年年度解析
pub const DEFAULT_MY_START_MONTH: u32 = 9;

// ==========================================
// MarketingYearDefinition - 市场年度定义
// ==========================================

/// 市场年度定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingYearDefinition {
    /// 国家代码
    pub country_code: String,
    /// 商品标识 (小写, 如 "corn", "soybean_meal")
    pub commodity: String,
    /// 市场年度起始月 (1-12)
    pub start_month: u32,
    /// 南半球标记
    ///
    /// 仅作为下游标注元数据存储, 不参与年度计算:
    /// 南北半球的年度换算公式一致, 差异只在收获季落于
    /// 跨年年度的哪一半 (见 DESIGN.md 未决问题 1)
    pub is_southern_hemisphere: bool,
    /// 年度标签格式
    pub label_format: LabelFormat,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketingYearDefinition {
    /// 构造缺省定义 (9 月起始, 北半球, 跨年标签)
    pub fn default_for(country_code: &str, commodity: &str) -> Self {
        let now = Utc::now();
        Self {
            country_code: country_code.to_string(),
            commodity: commodity.to_string(),
            start_month: DEFAULT_MY_START_MONTH,
            is_southern_hemisphere: false,
            label_format: LabelFormat::SplitYear,
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// MarketingYear - 市场年度解析结果
// ==========================================

/// 市场年度解析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketingYear {
    /// 年度标签 (如 "2024/25" 或 "2024")
    pub label: String,
    /// 年度起始年
    pub start_year: i32,
    /// 年度结束年 (跨年年度为起始年 + 1, 自然年年度等于起始年)
    pub end_year: i32,
    /// 南半球标记 (透传自定义, 供下游标注)
    pub is_southern_hemisphere: bool,
}
