// ==========================================
// 农产品贸易参考数据核心 - 换算规则实体
// ==========================================
// 职责: 定义商品单位换算规则及换算结果
// 红线: 规则只增不删; 修正以"关闭旧窗口 + 插入新行"方式版本化
// ==========================================

use crate::domain::types::{FlowDirection, SourceUnit};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ConversionRule - 商品单位换算规则
// ==========================================

/// 商品单位换算规则
///
/// 换算公式: display_quantity = source_quantity * conversion_factor
///
/// # 版本化
/// - 自然键: (hs_code_10, flow_direction, valid_from)
/// - 任一时点上 (hs_code_10, flow_direction) 至多一条生效规则
/// - 被修正的规则保留原行并关闭 valid_to, 保证历史报表可精确复现
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRule {
    /// 10 位贸易代码 (Schedule B / HTS)
    pub hs_code_10: String,
    /// 6 位 HS 族代码
    pub hs_code_6: String,
    /// 商品组 (如 SOYBEAN_MEAL)
    pub commodity_group: String,
    /// 贸易方向
    pub flow_direction: FlowDirection,
    /// 来源单位 (严格按 10 位代码区分, 不得按商品组推断)
    pub source_unit: SourceUnit,
    /// 展示单位标签 (如 "Short Tons", "000 Bushels")
    pub display_unit: String,
    /// 换算系数 (必须严格为正)
    pub conversion_factor: f64,
    /// 生效起始日 (None = 自始生效)
    pub valid_from: Option<NaiveDate>,
    /// 生效截止日 (None = 仍然生效)
    pub valid_to: Option<NaiveDate>,
    /// 是否可参与解析 (false = 代码整体退役, 任何日期都不再解析)
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversionRule {
    /// 判断生效窗口是否覆盖指定日期 (闭区间, 端点含)
    pub fn covers(&self, as_of: NaiveDate) -> bool {
        let from_ok = self.valid_from.map_or(true, |from| as_of >= from);
        let to_ok = self.valid_to.map_or(true, |to| as_of <= to);
        from_ok && to_ok
    }
}

// ==========================================
// ConvertedQuantity - 换算结果
// ==========================================

/// 换算结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedQuantity {
    /// 商品组
    pub commodity_group: String,
    /// 展示单位标签
    pub display_unit: String,
    /// 展示数量
    pub display_quantity: f64,
    /// 所用换算系数 (便于下游追溯)
    pub conversion_factor: f64,
}
