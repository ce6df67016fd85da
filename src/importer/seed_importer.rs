// ==========================================
// 农产品贸易参考数据核心 - 种子数据导入器
// ==========================================
// 职责: 将 seeds/ 下的参考数据 CSV 经仓储幂等 upsert 装载入库
// 约束: 导入可任意次重放, 同键同值不改变任何解析输出
// ==========================================

use crate::domain::conversion::ConversionRule;
use crate::domain::country::CountryMapping;
use crate::domain::marketing_year::MarketingYearDefinition;
use crate::domain::types::{FlowDirection, LabelFormat, SourceUnit};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::{
    ConversionRuleRepository, CountryMappingRepository, MarketingYearRepository,
};
use chrono::{NaiveDate, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

/// 换算规则种子文件名
pub const CONVERSION_RULES_FILE: &str = "conversion_rules.csv";
/// 市场年度种子文件名
pub const MARKETING_YEARS_FILE: &str = "marketing_years.csv";
/// 历史国家映射种子文件名
pub const COUNTRY_MAPPINGS_FILE: &str = "country_mappings.csv";

// ==========================================
// 种子行结构 (列名与自然键对齐)
// ==========================================

#[derive(Debug, Deserialize)]
struct ConversionRuleSeedRow {
    hs_code_10: String,
    hs_code_6: String,
    commodity_group: String,
    flow_direction: FlowDirection,
    source_unit: SourceUnit,
    display_unit: String,
    conversion_factor: f64,
    valid_from: Option<NaiveDate>,
    valid_to: Option<NaiveDate>,
    is_active: u8,
}

#[derive(Debug, Deserialize)]
struct MarketingYearSeedRow {
    country_code: String,
    commodity: String,
    start_month: u32,
    is_southern_hemisphere: u8,
    label_format: LabelFormat,
}

#[derive(Debug, Deserialize)]
struct CountryMappingSeedRow {
    historical_code: String,
    historical_name: String,
    current_code: String,
    current_name: String,
    dissolution_date: NaiveDate,
    is_primary_successor: u8,
    region: Option<String>,
}

// ==========================================
// ImportSummary - 导入统计
// ==========================================

/// 导入统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub conversion_rules: usize,
    pub marketing_years: usize,
    pub country_mappings: usize,
}

// ==========================================
// SeedImporter - 种子数据导入器
// ==========================================

/// 种子数据导入器
pub struct SeedImporter<'a> {
    conversion_repo: &'a ConversionRuleRepository,
    marketing_year_repo: &'a MarketingYearRepository,
    country_repo: &'a CountryMappingRepository,
}

impl<'a> SeedImporter<'a> {
    pub fn new(
        conversion_repo: &'a ConversionRuleRepository,
        marketing_year_repo: &'a MarketingYearRepository,
        country_repo: &'a CountryMappingRepository,
    ) -> Self {
        Self {
            conversion_repo,
            marketing_year_repo,
            country_repo,
        }
    }

    /// 导入种子目录下的全部参考数据文件
    ///
    /// # 参数
    /// - seed_dir: 含三个约定文件名 CSV 的目录
    pub fn import_all(&self, seed_dir: &Path) -> ImportResult<ImportSummary> {
        let summary = ImportSummary {
            conversion_rules: self.import_conversion_rules(&seed_dir.join(CONVERSION_RULES_FILE))?,
            marketing_years: self.import_marketing_years(&seed_dir.join(MARKETING_YEARS_FILE))?,
            country_mappings: self.import_country_mappings(&seed_dir.join(COUNTRY_MAPPINGS_FILE))?,
        };

        tracing::info!(
            conversion_rules = summary.conversion_rules,
            marketing_years = summary.marketing_years,
            country_mappings = summary.country_mappings,
            "种子数据导入完成"
        );

        Ok(summary)
    }

    /// 导入换算规则种子文件
    pub fn import_conversion_rules(&self, path: &Path) -> ImportResult<usize> {
        let mut count = 0;
        for (row_idx, row) in read_rows::<ConversionRuleSeedRow>(path)?.into_iter().enumerate() {
            let now = Utc::now();
            let rule = ConversionRule {
                hs_code_10: row.hs_code_10,
                hs_code_6: row.hs_code_6,
                commodity_group: row.commodity_group,
                flow_direction: row.flow_direction,
                source_unit: row.source_unit,
                display_unit: row.display_unit,
                conversion_factor: row.conversion_factor,
                valid_from: row.valid_from,
                valid_to: row.valid_to,
                is_active: row.is_active != 0,
                created_at: now,
                updated_at: now,
            };
            self.conversion_repo.upsert(&rule).map_err(|e| match e {
                crate::repository::RepositoryError::ValidationError(msg)
                | crate::repository::RepositoryError::FieldValueError { message: msg, .. } => {
                    ImportError::FieldValueError {
                        row: row_idx + 2, // 表头占第 1 行
                        field: "conversion_rule".to_string(),
                        message: msg,
                    }
                }
                other => ImportError::RepositoryError(other),
            })?;
            count += 1;
        }

        tracing::debug!(file = %path.display(), count, "换算规则已导入");
        Ok(count)
    }

    /// 导入市场年度种子文件
    pub fn import_marketing_years(&self, path: &Path) -> ImportResult<usize> {
        let mut count = 0;
        for row in read_rows::<MarketingYearSeedRow>(path)? {
            let now = Utc::now();
            let def = MarketingYearDefinition {
                country_code: row.country_code,
                commodity: row.commodity,
                start_month: row.start_month,
                is_southern_hemisphere: row.is_southern_hemisphere != 0,
                label_format: row.label_format,
                created_at: now,
                updated_at: now,
            };
            self.marketing_year_repo.upsert(&def)?;
            count += 1;
        }

        tracing::debug!(file = %path.display(), count, "市场年度定义已导入");
        Ok(count)
    }

    /// 导入历史国家映射种子文件
    pub fn import_country_mappings(&self, path: &Path) -> ImportResult<usize> {
        let mut count = 0;
        for row in read_rows::<CountryMappingSeedRow>(path)? {
            let mapping = CountryMapping {
                historical_code: row.historical_code,
                historical_name: row.historical_name,
                current_code: row.current_code,
                current_name: row.current_name,
                dissolution_date: row.dissolution_date,
                is_primary_successor: row.is_primary_successor != 0,
                region: row.region.filter(|r| !r.is_empty()),
                created_at: Utc::now(),
            };
            self.country_repo.upsert(&mapping)?;
            count += 1;
        }

        tracing::debug!(file = %path.display(), count, "历史国家映射已导入");
        Ok(count)
    }
}

/// 读取 CSV 文件的全部数据行
fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> ImportResult<Vec<T>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        rows.push(result?);
    }
    Ok(rows)
}
