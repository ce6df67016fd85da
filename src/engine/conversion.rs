// ==========================================
// 农产品贸易参考数据核心 - 商品换算解析器
// ==========================================
// 职责: 按 (10 位 HS 代码, 贸易方向, 日期) 解析换算规则并换算数量
// 红线: 无状态、无副作用、无 I/O; 单位约定严格按 10 位代码,
//       绝不按商品组推断 (相邻代码可分别以 KG/MT 上报)
// ==========================================

use crate::domain::conversion::ConvertedQuantity;
use crate::engine::error::{ResolverError, ResolverResult};
use crate::engine::snapshot::ReferenceSnapshot;
use crate::domain::types::FlowDirection;
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// ConversionResolver - 商品换算解析器
// ==========================================

/// 商品换算解析器 (共享只读快照的轻量句柄)
#[derive(Debug, Clone)]
pub struct ConversionResolver {
    snapshot: Arc<ReferenceSnapshot>,
}

impl ConversionResolver {
    pub fn new(snapshot: Arc<ReferenceSnapshot>) -> Self {
        Self { snapshot }
    }

    /// 换算原始数量到展示单位
    ///
    /// # 规则
    /// 1. raw_quantity < 0 → InvalidQuantity
    /// 2. 取 (hs_code_10, flow_direction) 下 is_active 且生效窗口
    ///    覆盖 as_of 的规则
    /// 3. 命中 0 条 → UnknownCommodityCode
    /// 4. 命中多条 → AmbiguousConversionRule (装载缺陷, 致命)
    /// 5. display_quantity = raw_quantity * conversion_factor
    ///
    /// # 参数
    /// - hs_code_10: 10 位贸易代码
    /// - flow_direction: 贸易方向
    /// - raw_quantity: 原始数量 (按规则 source_unit 计)
    /// - as_of: 解析基准日期 (历史日期按当时生效的规则换算)
    pub fn convert(
        &self,
        hs_code_10: &str,
        flow_direction: FlowDirection,
        raw_quantity: f64,
        as_of: NaiveDate,
    ) -> ResolverResult<ConvertedQuantity> {
        if raw_quantity < 0.0 {
            return Err(ResolverError::InvalidQuantity {
                quantity: raw_quantity,
            });
        }

        let matched: Vec<_> = self
            .snapshot
            .conversion_rules_for(hs_code_10, flow_direction)
            .iter()
            .filter(|rule| rule.is_active && rule.covers(as_of))
            .collect();

        let rule = match matched.as_slice() {
            [] => {
                return Err(ResolverError::UnknownCommodityCode {
                    hs_code_10: hs_code_10.to_string(),
                    flow_direction,
                    as_of,
                })
            }
            [single] => *single,
            many => {
                return Err(ResolverError::AmbiguousConversionRule {
                    hs_code_10: hs_code_10.to_string(),
                    flow_direction,
                    as_of,
                    matched: many.len(),
                })
            }
        };

        Ok(ConvertedQuantity {
            commodity_group: rule.commodity_group.clone(),
            display_unit: rule.display_unit.clone(),
            display_quantity: raw_quantity * rule.conversion_factor,
            conversion_factor: rule.conversion_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversion::ConversionRule;
    use crate::domain::types::SourceUnit;
    use crate::engine::snapshot::ReferenceSnapshotBuilder;
    use chrono::Utc;

    /// 大豆粕换算系数: KG → Short Tons (1/907.185)
    const SOYBEAN_MEAL_FACTOR: f64 = 1.0 / 907.185;

    fn rule(
        hs_code_10: &str,
        flow: FlowDirection,
        factor: f64,
        valid_from: Option<NaiveDate>,
        valid_to: Option<NaiveDate>,
    ) -> ConversionRule {
        ConversionRule {
            hs_code_10: hs_code_10.to_string(),
            hs_code_6: hs_code_10[..6].to_string(),
            commodity_group: "SOYBEAN_MEAL".to_string(),
            flow_direction: flow,
            source_unit: SourceUnit::Kg,
            display_unit: "Short Tons".to_string(),
            conversion_factor: factor,
            valid_from,
            valid_to,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resolver_with(rules: Vec<ConversionRule>) -> ConversionResolver {
        let mut builder = ReferenceSnapshotBuilder::new();
        for r in rules {
            builder = builder.add_conversion_rule(r);
        }
        ConversionResolver::new(builder.build().unwrap())
    }

    // ==========================================
    // 测试 1: 基本换算与往返
    // ==========================================

    #[test]
    fn test_convert_soybean_meal_round_trip() {
        // 907185 KG ≈ 1000 Short Tons
        let resolver = resolver_with(vec![rule(
            "2304000000",
            FlowDirection::Export,
            SOYBEAN_MEAL_FACTOR,
            None,
            None,
        )]);

        let out = resolver
            .convert("2304000000", FlowDirection::Export, 907_185.0, date(2024, 6, 1))
            .unwrap();

        assert_eq!(out.display_unit, "Short Tons");
        assert_eq!(out.commodity_group, "SOYBEAN_MEAL");
        assert!((out.display_quantity - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_convert_is_linear() {
        let resolver = resolver_with(vec![rule(
            "2304000000",
            FlowDirection::Export,
            SOYBEAN_MEAL_FACTOR,
            None,
            None,
        )]);
        let as_of = date(2024, 6, 1);

        let one = resolver
            .convert("2304000000", FlowDirection::Export, 12_345.0, as_of)
            .unwrap();
        let two = resolver
            .convert("2304000000", FlowDirection::Export, 24_690.0, as_of)
            .unwrap();

        assert!((two.display_quantity - 2.0 * one.display_quantity).abs() < 1e-9);
    }

    #[test]
    fn test_convert_zero_quantity() {
        let resolver = resolver_with(vec![rule(
            "2304000000",
            FlowDirection::Export,
            SOYBEAN_MEAL_FACTOR,
            None,
            None,
        )]);

        let out = resolver
            .convert("2304000000", FlowDirection::Export, 0.0, date(2024, 6, 1))
            .unwrap();
        assert_eq!(out.display_quantity, 0.0);
    }

    // ==========================================
    // 测试 2: 失败路径
    // ==========================================

    #[test]
    fn test_convert_negative_quantity() {
        let resolver = resolver_with(vec![rule(
            "2304000000",
            FlowDirection::Export,
            SOYBEAN_MEAL_FACTOR,
            None,
            None,
        )]);

        let err = resolver
            .convert("2304000000", FlowDirection::Export, -1.0, date(2024, 6, 1))
            .unwrap_err();
        assert!(matches!(err, ResolverError::InvalidQuantity { .. }));
    }

    #[test]
    fn test_convert_unknown_code() {
        let resolver = resolver_with(vec![]);
        let err = resolver
            .convert("9999999999", FlowDirection::Import, 100.0, date(2024, 6, 1))
            .unwrap_err();
        assert!(matches!(err, ResolverError::UnknownCommodityCode { .. }));
    }

    #[test]
    fn test_convert_flow_direction_is_part_of_key() {
        // 仅建出口规则时, 进口方向无匹配
        let resolver = resolver_with(vec![rule(
            "2304000000",
            FlowDirection::Export,
            SOYBEAN_MEAL_FACTOR,
            None,
            None,
        )]);

        let err = resolver
            .convert("2304000000", FlowDirection::Import, 100.0, date(2024, 6, 1))
            .unwrap_err();
        assert!(matches!(err, ResolverError::UnknownCommodityCode { .. }));
    }

    #[test]
    fn test_convert_ambiguous_overlapping_windows() {
        // 两条生效规则窗口重叠 → 致命, 绝不静默任选
        let resolver = resolver_with(vec![
            rule(
                "2304000000",
                FlowDirection::Export,
                SOYBEAN_MEAL_FACTOR,
                None,
                None,
            ),
            rule(
                "2304000000",
                FlowDirection::Export,
                1.1023113,
                Some(date(2020, 1, 1)),
                None,
            ),
        ]);

        let err = resolver
            .convert("2304000000", FlowDirection::Export, 100.0, date(2024, 6, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            ResolverError::AmbiguousConversionRule { matched: 2, .. }
        ));
    }

    // ==========================================
    // 测试 3: 窗口版本化 (历史复现)
    // ==========================================

    #[test]
    fn test_convert_historical_window_reproduces_old_factor() {
        // 2020-01-01 起修正: 旧窗口关闭, 历史日期仍按旧系数换算
        let old_factor = 1.1023113; // 误按 MT 约定的历史系数
        let resolver = resolver_with(vec![
            rule(
                "2304000000",
                FlowDirection::Import,
                old_factor,
                None,
                Some(date(2019, 12, 31)),
            ),
            rule(
                "2304000000",
                FlowDirection::Import,
                SOYBEAN_MEAL_FACTOR,
                Some(date(2020, 1, 1)),
                None,
            ),
        ]);

        let historical = resolver
            .convert("2304000000", FlowDirection::Import, 1000.0, date(2018, 5, 1))
            .unwrap();
        assert!((historical.conversion_factor - old_factor).abs() < 1e-12);

        let current = resolver
            .convert("2304000000", FlowDirection::Import, 1000.0, date(2024, 5, 1))
            .unwrap();
        assert!((current.conversion_factor - SOYBEAN_MEAL_FACTOR).abs() < 1e-12);
    }

    #[test]
    fn test_convert_retired_rule_never_matches() {
        let mut retired = rule(
            "2304000000",
            FlowDirection::Export,
            SOYBEAN_MEAL_FACTOR,
            None,
            None,
        );
        retired.is_active = false;

        let resolver = resolver_with(vec![retired]);
        let err = resolver
            .convert("2304000000", FlowDirection::Export, 100.0, date(2015, 1, 1))
            .unwrap_err();
        assert!(matches!(err, ResolverError::UnknownCommodityCode { .. }));
    }
}
