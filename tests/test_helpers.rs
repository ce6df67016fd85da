// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use ag_trade_ref::domain::conversion::ConversionRule;
use ag_trade_ref::domain::country::CountryMapping;
use ag_trade_ref::domain::marketing_year::MarketingYearDefinition;
use ag_trade_ref::domain::types::{FlowDirection, LabelFormat, SourceUnit};
use ag_trade_ref::repository::{
    ConversionRuleRepository, CountryMappingRepository, MarketingYearRepository,
};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    ag_trade_ref::logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    ag_trade_ref::db::configure_sqlite_connection(&conn)?;
    ag_trade_ref::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 基于共享连接创建三个参考数据仓储
pub fn open_repos(
    db_path: &str,
) -> Result<
    (
        ConversionRuleRepository,
        MarketingYearRepository,
        CountryMappingRepository,
    ),
    Box<dyn Error>,
> {
    let conn = ag_trade_ref::db::open_sqlite_connection(db_path)?;
    let conn = Arc::new(Mutex::new(conn));
    Ok((
        ConversionRuleRepository::from_connection(conn.clone()),
        MarketingYearRepository::from_connection(conn.clone()),
        CountryMappingRepository::from_connection(conn),
    ))
}

/// 创建测试用换算规则
pub fn sample_rule(
    hs_code_10: &str,
    flow_direction: FlowDirection,
    factor: f64,
    valid_from: Option<NaiveDate>,
    valid_to: Option<NaiveDate>,
) -> ConversionRule {
    let now = Utc::now();
    ConversionRule {
        hs_code_10: hs_code_10.to_string(),
        hs_code_6: hs_code_10[..6].to_string(),
        commodity_group: "SOYBEAN_MEAL".to_string(),
        flow_direction,
        source_unit: SourceUnit::Kg,
        display_unit: "Short Tons".to_string(),
        conversion_factor: factor,
        valid_from,
        valid_to,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// 创建测试用市场年度定义
pub fn sample_def(
    country_code: &str,
    commodity: &str,
    start_month: u32,
    is_southern_hemisphere: bool,
) -> MarketingYearDefinition {
    let now = Utc::now();
    MarketingYearDefinition {
        country_code: country_code.to_string(),
        commodity: commodity.to_string(),
        start_month,
        is_southern_hemisphere,
        label_format: LabelFormat::SplitYear,
        created_at: now,
        updated_at: now,
    }
}

/// 创建测试用历史国家映射
pub fn sample_mapping(
    historical: (&str, &str),
    current: (&str, &str),
    dissolution_date: NaiveDate,
    is_primary_successor: bool,
) -> CountryMapping {
    CountryMapping {
        historical_code: historical.0.to_string(),
        historical_name: historical.1.to_string(),
        current_code: current.0.to_string(),
        current_name: current.1.to_string(),
        dissolution_date,
        is_primary_successor,
        region: None,
        created_at: Utc::now(),
    }
}

/// 日期快捷构造
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
