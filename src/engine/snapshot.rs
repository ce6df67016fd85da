// ==========================================
// 农产品贸易参考数据核心 - 参考数据快照
// ==========================================
// 职责: 将参考数据装载为不可变的版本化内存快照
// 红线: 快照只读; 修正系数产生新快照, 绝不改写已装载快照
//       (已算出的历史聚合必须可精确复现)
// ==========================================

use crate::domain::conversion::ConversionRule;
use crate::domain::country::CountryMapping;
use crate::domain::marketing_year::MarketingYearDefinition;
use crate::domain::types::{FlowDirection, LabelFormat};
use crate::engine::error::SnapshotError;
use crate::repository::{
    ConversionRuleRepository, CountryMappingRepository, MarketingYearRepository, RepositoryError,
    RepositoryResult,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// ReferenceSnapshot - 不可变参考数据快照
// ==========================================

/// 参考数据快照
///
/// 以 (snapshot_id, loaded_at) 标识一次装载; 三类参考表
/// 在快照内按解析所需的键索引, 解析器只读共享 (Arc)
#[derive(Debug)]
pub struct ReferenceSnapshot {
    /// 快照版本标识
    pub snapshot_id: Uuid,
    /// 装载时间
    pub loaded_at: DateTime<Utc>,
    /// 换算规则: (hs_code_10, flow_direction) → 全部版本行
    conversion_rules: HashMap<(String, FlowDirection), Vec<ConversionRule>>,
    /// 市场年度定义: (country_code, commodity) → 定义
    marketing_years: HashMap<(String, String), MarketingYearDefinition>,
    /// 历史国家映射: historical_code → 映射行 (主继承国在前)
    country_mappings: HashMap<String, Vec<CountryMapping>>,
}

impl ReferenceSnapshot {
    /// 查询 (代码, 方向) 的全部规则版本行
    pub fn conversion_rules_for(
        &self,
        hs_code_10: &str,
        flow_direction: FlowDirection,
    ) -> &[ConversionRule] {
        self.conversion_rules
            .get(&(hs_code_10.to_string(), flow_direction))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 查询 (国家, 商品) 的市场年度定义
    pub fn marketing_year_for(
        &self,
        country_code: &str,
        commodity: &str,
    ) -> Option<&MarketingYearDefinition> {
        self.marketing_years
            .get(&(country_code.to_string(), commodity.to_string()))
    }

    /// 查询历史代码的映射行 (主继承国在前)
    pub fn country_mappings_for(&self, historical_code: &str) -> &[CountryMapping] {
        self.country_mappings
            .get(historical_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 快照内各表行数 (换算规则, 市场年度, 国家映射)
    pub fn table_counts(&self) -> (usize, usize, usize) {
        (
            self.conversion_rules.values().map(Vec::len).sum(),
            self.marketing_years.len(),
            self.country_mappings.values().map(Vec::len).sum(),
        )
    }
}

// ==========================================
// ReferenceSnapshotBuilder - 快照构建器
// ==========================================

/// 快照构建器 (内存批量装载接口)
///
/// 接受与种子数据相同的自然键行, 行序无关; build 时做
/// 不变式校验并冻结为 Arc<ReferenceSnapshot>
#[derive(Debug, Default)]
pub struct ReferenceSnapshotBuilder {
    conversion_rules: Vec<ConversionRule>,
    marketing_years: Vec<MarketingYearDefinition>,
    country_mappings: Vec<CountryMapping>,
}

impl ReferenceSnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加换算规则行
    pub fn add_conversion_rule(mut self, rule: ConversionRule) -> Self {
        self.conversion_rules.push(rule);
        self
    }

    /// 追加市场年度定义行
    pub fn add_marketing_year(mut self, def: MarketingYearDefinition) -> Self {
        self.marketing_years.push(def);
        self
    }

    /// 追加历史国家映射行
    pub fn add_country_mapping(mut self, mapping: CountryMapping) -> Self {
        self.country_mappings.push(mapping);
        self
    }

    /// 校验并冻结快照
    ///
    /// # 校验
    /// - 换算系数严格为正
    /// - 市场年度起始月在 1-12 之间
    /// - 单年标签当且仅当 1 月起始 (标签格式与推导公式一致)
    ///
    /// # 说明
    /// 生效窗口重叠不在此处拒绝: 歧义在解析时点才可判定
    /// (窗口是否重叠取决于 as_of), 由解析器以致命错误爆出
    pub fn build(self) -> Result<Arc<ReferenceSnapshot>, SnapshotError> {
        let mut conversion_rules: HashMap<(String, FlowDirection), Vec<ConversionRule>> =
            HashMap::new();
        for rule in self.conversion_rules {
            if rule.conversion_factor <= 0.0 {
                return Err(SnapshotError::InvalidConversionFactor {
                    hs_code_10: rule.hs_code_10,
                    factor: rule.conversion_factor,
                });
            }
            conversion_rules
                .entry((rule.hs_code_10.clone(), rule.flow_direction))
                .or_default()
                .push(rule);
        }

        let mut marketing_years = HashMap::new();
        for def in self.marketing_years {
            if !(1..=12).contains(&def.start_month) {
                return Err(SnapshotError::InvalidStartMonth {
                    country_code: def.country_code,
                    commodity: def.commodity,
                    start_month: def.start_month,
                });
            }
            if (def.label_format == LabelFormat::SingleYear) != (def.start_month == 1) {
                return Err(SnapshotError::InconsistentLabelFormat {
                    country_code: def.country_code,
                    commodity: def.commodity,
                    start_month: def.start_month,
                    label_format: def.label_format,
                });
            }
            marketing_years.insert((def.country_code.clone(), def.commodity.clone()), def);
        }

        let mut country_mappings: HashMap<String, Vec<CountryMapping>> = HashMap::new();
        for mapping in self.country_mappings {
            country_mappings
                .entry(mapping.historical_code.clone())
                .or_default()
                .push(mapping);
        }
        // 主继承国在前, 其余按继承国代码排序
        for successors in country_mappings.values_mut() {
            successors.sort_by(|a, b| {
                b.is_primary_successor
                    .cmp(&a.is_primary_successor)
                    .then_with(|| a.current_code.cmp(&b.current_code))
            });
        }

        let snapshot = ReferenceSnapshot {
            snapshot_id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            conversion_rules,
            marketing_years,
            country_mappings,
        };

        tracing::debug!(
            snapshot_id = %snapshot.snapshot_id,
            counts = ?snapshot.table_counts(),
            "参考数据快照已冻结"
        );

        Ok(Arc::new(snapshot))
    }
}

// ==========================================
// 仓储装载入口
// ==========================================

/// 从仓储装载参考数据快照
///
/// # 返回
/// - Ok(Arc<ReferenceSnapshot>): 装载完成的不可变快照
/// - Err: 数据库错误, 或参考数据违反不变式 (以 ValidationError 形态上抛)
pub fn load_reference_snapshot(
    conversion_repo: &ConversionRuleRepository,
    marketing_year_repo: &MarketingYearRepository,
    country_repo: &CountryMappingRepository,
) -> RepositoryResult<Arc<ReferenceSnapshot>> {
    let mut builder = ReferenceSnapshotBuilder::new();

    for rule in conversion_repo.list_all()? {
        builder = builder.add_conversion_rule(rule);
    }
    for def in marketing_year_repo.list_all()? {
        builder = builder.add_marketing_year(def);
    }
    for mapping in country_repo.list_all()? {
        builder = builder.add_country_mapping(mapping);
    }

    let snapshot = builder
        .build()
        .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;

    tracing::info!(
        snapshot_id = %snapshot.snapshot_id,
        loaded_at = %snapshot.loaded_at,
        "参考数据快照装载完成"
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SourceUnit;

    fn sample_rule(factor: f64) -> ConversionRule {
        ConversionRule {
            hs_code_10: "2304000000".to_string(),
            hs_code_6: "230400".to_string(),
            commodity_group: "SOYBEAN_MEAL".to_string(),
            flow_direction: FlowDirection::Export,
            source_unit: SourceUnit::Kg,
            display_unit: "Short Tons".to_string(),
            conversion_factor: factor,
            valid_from: None,
            valid_to: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_rejects_non_positive_factor() {
        let err = ReferenceSnapshotBuilder::new()
            .add_conversion_rule(sample_rule(0.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidConversionFactor { .. }));

        let err = ReferenceSnapshotBuilder::new()
            .add_conversion_rule(sample_rule(-1.5))
            .build()
            .unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidConversionFactor { .. }));
    }

    #[test]
    fn test_build_rejects_out_of_range_start_month() {
        let mut def = MarketingYearDefinition::default_for("US", "corn");
        def.start_month = 13;

        let err = ReferenceSnapshotBuilder::new()
            .add_marketing_year(def)
            .build()
            .unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidStartMonth { .. }));
    }

    #[test]
    fn test_build_rejects_inconsistent_label_format() {
        // 单年标签配非 1 月起始
        let mut def = MarketingYearDefinition::default_for("CN", "sugar");
        def.start_month = 10;
        def.label_format = LabelFormat::SingleYear;
        let err = ReferenceSnapshotBuilder::new()
            .add_marketing_year(def)
            .build()
            .unwrap_err();
        assert!(matches!(err, SnapshotError::InconsistentLabelFormat { .. }));

        // 跨年标签配 1 月起始
        let mut def = MarketingYearDefinition::default_for("CN", "sugar");
        def.start_month = 1;
        let err = ReferenceSnapshotBuilder::new()
            .add_marketing_year(def)
            .build()
            .unwrap_err();
        assert!(matches!(err, SnapshotError::InconsistentLabelFormat { .. }));
    }

    #[test]
    fn test_snapshots_are_independent() {
        // 两次构建产生不同版本标识, 互不影响
        let a = ReferenceSnapshotBuilder::new()
            .add_conversion_rule(sample_rule(0.0011023113))
            .build()
            .unwrap();
        let b = ReferenceSnapshotBuilder::new().build().unwrap();

        assert_ne!(a.snapshot_id, b.snapshot_id);
        assert_eq!(a.table_counts().0, 1);
        assert_eq!(b.table_counts().0, 0);
    }

    #[test]
    fn test_country_mappings_sorted_primary_first() {
        let now = Utc::now();
        let mapping = |code: &str, name: &str, primary: bool| CountryMapping {
            historical_code: "4620".to_string(),
            historical_name: "USSR".to_string(),
            current_code: code.to_string(),
            current_name: name.to_string(),
            dissolution_date: chrono::NaiveDate::from_ymd_opt(1991, 12, 26).unwrap(),
            is_primary_successor: primary,
            region: None,
            created_at: now,
        };

        let snapshot = ReferenceSnapshotBuilder::new()
            .add_country_mapping(mapping("4623", "Ukraine", false))
            .add_country_mapping(mapping("4621", "Russia", true))
            .add_country_mapping(mapping("4622", "Belarus", false))
            .build()
            .unwrap();

        let rows = snapshot.country_mappings_for("4620");
        assert_eq!(rows[0].current_code, "4621"); // 主继承国在前
        assert_eq!(rows[1].current_code, "4622"); // 其余按代码排序
        assert_eq!(rows[2].current_code, "4623");
    }
}
