// ==========================================
// 农产品贸易参考数据核心 - 标准化 API
// ==========================================
// 职责: 面向 ETL 管道的组合接口: 原始贸易记录 →
//       (单位换算 → 市场年度归档 → 规范国家归属) → 标准化记录
// 架构: API 层 → 引擎层 (三个解析器), 不触数据库
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::FlowDirection;
use crate::engine::{
    ConversionResolver, CountryResolver, MarketingYearResolver, ReferenceSnapshot,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// 输入/输出记录
// ==========================================

/// 原始贸易记录 (采集器边界契约)
///
/// hs_code_10 与 quantity_unit 按采集器给定值信任;
/// quantity_unit 仅透传, 换算单位以规则表按代码判定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTradeRecord {
    pub hs_code_10: String,
    pub flow_direction: FlowDirection,
    pub quantity: f64,
    pub quantity_unit: String,
    pub year: i32,
    pub month: u32,
    pub country_code: String,
}

/// 标准化记录 (下游聚合/报表边界契约)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedRecord {
    pub commodity_group: String,
    pub display_unit: String,
    pub display_quantity: f64,
    pub marketing_year_label: String,
    pub canonical_country_code: String,
}

// ==========================================
// StandardizeApi - 标准化 API
// ==========================================

/// 标准化 API
///
/// 持有同一快照上的三个解析器句柄, 保证一批记录
/// 的换算/归档/归属使用一致的参考数据版本
pub struct StandardizeApi {
    conversion: ConversionResolver,
    marketing_year: MarketingYearResolver,
    country: CountryResolver,
}

impl StandardizeApi {
    pub fn new(snapshot: Arc<ReferenceSnapshot>) -> Self {
        Self {
            conversion: ConversionResolver::new(snapshot.clone()),
            marketing_year: MarketingYearResolver::new(snapshot.clone()),
            country: CountryResolver::new(snapshot),
        }
    }

    /// 标准化一条原始贸易记录
    ///
    /// # 规则
    /// 1. 基准日期取 (year, month) 当月首日 (月度数据的确定性选择)
    /// 2. 换算: 按 (hs_code_10, flow_direction, 基准日期) 解析规则
    /// 3. 市场年度: 商品键取换算规则的 commodity_group 小写
    /// 4. 规范国家: 基准日期下的主归属国 (解体前/未建映射原样透传)
    ///
    /// # 失败
    /// - InvalidInput: month 越界 (无法构造基准日期)
    /// - ResolverError: 换算解析失败 (未知代码/负数量/规则歧义)
    pub fn standardize(&self, record: &RawTradeRecord) -> ApiResult<StandardizedRecord> {
        let as_of = NaiveDate::from_ymd_opt(record.year, record.month, 1).ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "非法年月: year={}, month={}",
                record.year, record.month
            ))
        })?;

        let converted = self.conversion.convert(
            &record.hs_code_10,
            record.flow_direction,
            record.quantity,
            as_of,
        )?;

        let commodity_key = converted.commodity_group.to_ascii_lowercase();
        let marketing_year =
            self.marketing_year
                .resolve(&record.country_code, &commodity_key, record.year, record.month);

        // 解析结果主归属在前
        let canonical = self
            .country
            .resolve(&record.country_code, as_of)
            .into_iter()
            .next()
            .map(|r| r.country_code)
            .unwrap_or_else(|| record.country_code.clone());

        Ok(StandardizedRecord {
            commodity_group: converted.commodity_group,
            display_unit: converted.display_unit,
            display_quantity: converted.display_quantity,
            marketing_year_label: marketing_year.label,
            canonical_country_code: canonical,
        })
    }
}
