// ==========================================
// 农产品贸易参考数据核心 - 市场年度解析器
// ==========================================
// 职责: 按 (国家, 商品, 年, 月) 解析市场年度标签与结束年
// 红线: 全函数, 永不失败; 缺省回退 (9 月起始/北半球) 必须精确保持,
//       下游聚合隐性依赖该回退的确定性
// ==========================================

use crate::domain::marketing_year::{MarketingYear, MarketingYearDefinition};
use crate::domain::types::LabelFormat;
use crate::engine::snapshot::ReferenceSnapshot;
use std::sync::Arc;

// ==========================================
// MarketingYearResolver - 市场年度解析器
// ==========================================

/// 市场年度解析器 (共享只读快照的轻量句柄)
#[derive(Debug, Clone)]
pub struct MarketingYearResolver {
    snapshot: Arc<ReferenceSnapshot>,
}

impl MarketingYearResolver {
    pub fn new(snapshot: Arc<ReferenceSnapshot>) -> Self {
        Self { snapshot }
    }

    /// 解析市场年度
    ///
    /// # 规则
    /// 1. 取 (country_code, commodity) 定义; 无定义 → 缺省
    ///    (起始月 9, 北半球, 跨年标签)
    /// 2. month >= start_month → MY = year, 否则 MY = year - 1
    /// 3. 跨年年度: end_year = MY + 1, 标签 "{MY}/{(MY+1) % 100:02}"
    ///    自然年年度 (1 月起始): end_year = MY, 标签 "{MY}"
    ///
    /// # 参数
    /// - month: 日历月 (调用方保证 1-12)
    ///
    /// # 说明
    /// 南半球标记不参与计算, 仅透传 (见 DESIGN.md 未决问题 1)
    pub fn resolve(
        &self,
        country_code: &str,
        commodity: &str,
        year: i32,
        month: u32,
    ) -> MarketingYear {
        debug_assert!((1..=12).contains(&month), "month 越界: {}", month);

        let default_def;
        let def = match self.snapshot.marketing_year_for(country_code, commodity) {
            Some(found) => found,
            None => {
                default_def = MarketingYearDefinition::default_for(country_code, commodity);
                &default_def
            }
        };

        Self::resolve_with(def, year, month)
    }

    /// 按给定定义计算市场年度 (纯函数)
    pub fn resolve_with(def: &MarketingYearDefinition, year: i32, month: u32) -> MarketingYear {
        let start_year = if month >= def.start_month { year } else { year - 1 };

        let (label, end_year) = match def.label_format {
            LabelFormat::SingleYear => (format!("{}", start_year), start_year),
            LabelFormat::SplitYear => (
                format!("{}/{:02}", start_year, (start_year + 1).rem_euclid(100)),
                start_year + 1,
            ),
        };

        MarketingYear {
            label,
            start_year,
            end_year,
            is_southern_hemisphere: def.is_southern_hemisphere,
        }
    }
}
