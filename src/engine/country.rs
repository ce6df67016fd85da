// ==========================================
// 农产品贸易参考数据核心 - 历史国家解析器
// ==========================================
// 职责: 按 (历史国家代码, 贸易日期) 解析继承国列表
// 红线: 全函数, 永不失败; 未建映射的代码恒等透传
//       (对应源数据 COALESCE(successor, original) 的回退语义)
// ==========================================

use crate::domain::country::CountryResolution;
use crate::engine::snapshot::ReferenceSnapshot;
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// CountryResolver - 历史国家解析器
// ==========================================

/// 历史国家解析器 (共享只读快照的轻量句柄)
#[derive(Debug, Clone)]
pub struct CountryResolver {
    snapshot: Arc<ReferenceSnapshot>,
}

impl CountryResolver {
    pub fn new(snapshot: Arc<ReferenceSnapshot>) -> Self {
        Self { snapshot }
    }

    /// 解析历史代码在指定贸易日期的归属国列表
    ///
    /// # 规则
    /// 1. 无映射行 → 恒等透传 [{code, is_primary: true}]
    /// 2. 贸易日期早于全部解体日期 → 历史代码原样返回
    ///    (该实体当时尚未解体)
    /// 3. 否则返回 dissolution_date <= trade_date 的全部继承行,
    ///    主继承国在前
    pub fn resolve(&self, historical_code: &str, trade_date: NaiveDate) -> Vec<CountryResolution> {
        let mappings = self.snapshot.country_mappings_for(historical_code);

        if mappings.is_empty() {
            return vec![CountryResolution::identity(historical_code, None)];
        }

        // 快照内映射行已按主继承国在前排序
        let applicable: Vec<CountryResolution> = mappings
            .iter()
            .filter(|m| m.dissolution_date <= trade_date)
            .map(|m| CountryResolution {
                country_code: m.current_code.clone(),
                country_name: Some(m.current_name.clone()),
                is_primary: m.is_primary_successor,
            })
            .collect();

        if applicable.is_empty() {
            // 解体之前: 历史代码仍是有效实体
            return vec![CountryResolution::identity(
                historical_code,
                Some(mappings[0].historical_name.clone()),
            )];
        }

        applicable
    }

    /// 查询主继承国代码 (与日期无关的规范归属)
    ///
    /// # 返回
    /// - 存在映射: is_primary_successor = true 的继承国代码
    /// - 无映射: 原代码透传
    pub fn primary_successor(&self, historical_code: &str) -> String {
        self.snapshot
            .country_mappings_for(historical_code)
            .iter()
            .find(|m| m.is_primary_successor)
            .map(|m| m.current_code.clone())
            .unwrap_or_else(|| historical_code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::country::CountryMapping;
    use crate::engine::snapshot::ReferenceSnapshotBuilder;
    use chrono::Utc;

    fn mapping(
        historical: (&str, &str),
        current: (&str, &str),
        dissolution: NaiveDate,
        primary: bool,
    ) -> CountryMapping {
        CountryMapping {
            historical_code: historical.0.to_string(),
            historical_name: historical.1.to_string(),
            current_code: current.0.to_string(),
            current_name: current.1.to_string(),
            dissolution_date: dissolution,
            is_primary_successor: primary,
            region: None,
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ussr_resolver() -> CountryResolver {
        let dissolution = date(1991, 12, 26);
        let mut builder = ReferenceSnapshotBuilder::new()
            .add_country_mapping(mapping(("4620", "USSR"), ("4621", "Russia"), dissolution, true));
        for (code, name) in [
            ("4622", "Belarus"),
            ("4623", "Ukraine"),
            ("4631", "Armenia"),
            ("4632", "Azerbaijan"),
            ("4633", "Georgia"),
            ("4634", "Kazakhstan"),
            ("4635", "Kyrgyzstan"),
            ("4636", "Moldova"),
            ("4642", "Tajikistan"),
            ("4643", "Turkmenistan"),
            ("4644", "Uzbekistan"),
            ("4470", "Estonia"),
            ("4490", "Latvia"),
            ("4510", "Lithuania"),
        ] {
            builder = builder
                .add_country_mapping(mapping(("4620", "USSR"), (code, name), dissolution, false));
        }
        CountryResolver::new(builder.build().unwrap())
    }

    // ==========================================
    // 测试 1: 解体日期前后 (苏联 4620)
    // ==========================================

    #[test]
    fn test_ussr_before_dissolution_passes_through() {
        let resolver = ussr_resolver();
        let resolved = resolver.resolve("4620", date(1990, 6, 1));

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].country_code, "4620");
        assert!(resolved[0].is_primary);
        assert_eq!(resolved[0].country_name.as_deref(), Some("USSR"));
    }

    #[test]
    fn test_ussr_after_dissolution_returns_successors() {
        let resolver = ussr_resolver();
        let resolved = resolver.resolve("4620", date(1995, 1, 1));

        assert!(resolved.len() >= 12);
        assert_eq!(resolved[0].country_code, "4621"); // 主继承国在前
        assert_eq!(resolved[0].country_name.as_deref(), Some("Russia"));
        assert!(resolved[0].is_primary);
        assert_eq!(resolved.iter().filter(|r| r.is_primary).count(), 1);
    }

    #[test]
    fn test_ussr_dissolution_date_is_inclusive() {
        let resolver = ussr_resolver();
        let resolved = resolver.resolve("4620", date(1991, 12, 26));
        assert_eq!(resolved[0].country_code, "4621");
    }

    // ==========================================
    // 测试 2: 主继承国查询 (捷克斯洛伐克 4350)
    // ==========================================

    #[test]
    fn test_czechoslovakia_primary_successor() {
        let dissolution = date(1993, 1, 1);
        let snapshot = ReferenceSnapshotBuilder::new()
            .add_country_mapping(mapping(
                ("4350", "Czechoslovakia"),
                ("4351", "Czech Republic"),
                dissolution,
                true,
            ))
            .add_country_mapping(mapping(
                ("4350", "Czechoslovakia"),
                ("4781", "Slovakia"),
                dissolution,
                false,
            ))
            .build()
            .unwrap();
        let resolver = CountryResolver::new(snapshot);

        assert_eq!(resolver.primary_successor("4350"), "4351");
    }

    // ==========================================
    // 测试 3: 恒等透传
    // ==========================================

    #[test]
    fn test_unmapped_code_identity() {
        let resolver = CountryResolver::new(ReferenceSnapshotBuilder::new().build().unwrap());

        let resolved = resolver.resolve("5700", date(2024, 1, 1));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].country_code, "5700");
        assert!(resolved[0].is_primary);
        assert!(resolved[0].country_name.is_none());

        assert_eq!(resolver.primary_successor("5700"), "5700");
    }
}
