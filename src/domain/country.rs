// ==========================================
// 农产品贸易参考数据核心 - 历史国家映射实体
// ==========================================
// 职责: 定义历史/已解体国家代码到继承国代码的映射
// 红线: 仅追加, 不修改既有映射行; 每个历史代码恰有一个主继承国
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// CountryMapping - 历史国家继承映射
// ==========================================

/// 历史国家继承映射
///
/// 一个历史代码可映射到一个或多个继承国 (如苏联 → 15 个继承国),
/// 其中恰有一行 is_primary_successor = true
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryMapping {
    /// 历史国家代码 (如 "4620" 苏联)
    pub historical_code: String,
    /// 历史国家名称
    pub historical_name: String,
    /// 继承国代码
    pub current_code: String,
    /// 继承国名称
    pub current_name: String,
    /// 解体日期 (早于该日期的贸易记录不适用映射)
    pub dissolution_date: NaiveDate,
    /// 主继承国标记 (缺省聚合归属)
    pub is_primary_successor: bool,
    /// 区域标签
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// CountryResolution - 国家解析结果
// ==========================================

/// 国家解析结果 (单个国家)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryResolution {
    /// 国家代码
    pub country_code: String,
    /// 国家名称 (未建映射的代码透传时为 None)
    pub country_name: Option<String>,
    /// 是否主归属 (透传/主继承国为 true)
    pub is_primary: bool,
}

impl CountryResolution {
    /// 构造恒等透传结果 (代码原样返回)
    pub fn identity(country_code: &str, country_name: Option<String>) -> Self {
        Self {
            country_code: country_code.to_string(),
            country_name,
            is_primary: true,
        }
    }
}
