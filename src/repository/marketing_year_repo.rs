// ==========================================
// 农产品贸易参考数据核心 - 市场年度定义仓储
// ==========================================
// 职责: 管理 marketing_year_def 表的装载与查询
// 红线: Repository 不含业务逻辑 (缺省回退在引擎层)
// ==========================================

use crate::domain::marketing_year::MarketingYearDefinition;
use crate::domain::types::LabelFormat;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// MarketingYearRepository - 市场年度定义仓储
// ==========================================

/// 市场年度定义仓储
pub struct MarketingYearRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MarketingYearRepository {
    /// 创建新的市场年度定义仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 幂等 upsert 一条市场年度定义
    ///
    /// # 自然键
    /// - (country_code, commodity)
    ///
    /// # 校验
    /// - start_month 必须在 1-12 之间
    /// - 单年标签当且仅当 1 月起始 (标签格式与推导公式一致)
    pub fn upsert(&self, def: &MarketingYearDefinition) -> RepositoryResult<()> {
        if !(1..=12).contains(&def.start_month) {
            return Err(RepositoryError::FieldValueError {
                field: "start_month".to_string(),
                message: format!("起始月必须在 1-12 之间: {}", def.start_month),
            });
        }
        if (def.label_format == LabelFormat::SingleYear) != (def.start_month == 1) {
            return Err(RepositoryError::FieldValueError {
                field: "label_format".to_string(),
                message: format!(
                    "年度标签格式与起始月不一致: start_month={}, label_format={}",
                    def.start_month, def.label_format
                ),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO marketing_year_def (
                country_code, commodity, start_month, is_southern_hemisphere,
                label_format, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(country_code, commodity) DO UPDATE SET
                start_month = ?3,
                is_southern_hemisphere = ?4,
                label_format = ?5,
                updated_at = ?7
            "#,
            params![
                def.country_code,
                def.commodity,
                def.start_month,
                def.is_southern_hemisphere as i64,
                def.label_format.to_string(),
                def.created_at.to_rfc3339(),
                def.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// 按 (国家代码, 商品) 查询定义
    pub fn find(
        &self,
        country_code: &str,
        commodity: &str,
    ) -> RepositoryResult<Option<MarketingYearDefinition>> {
        let conn = self.get_conn()?;
        let def = conn
            .query_row(
                r#"
                SELECT country_code, commodity, start_month, is_southern_hemisphere,
                       label_format, created_at, updated_at
                FROM marketing_year_def
                WHERE country_code = ?1 AND commodity = ?2
                "#,
                params![country_code, commodity],
                map_def_row,
            )
            .optional()?;

        Ok(def)
    }

    /// 列出全部定义 (快照装载用)
    pub fn list_all(&self) -> RepositoryResult<Vec<MarketingYearDefinition>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT country_code, commodity, start_month, is_southern_hemisphere,
                   label_format, created_at, updated_at
            FROM marketing_year_def
            ORDER BY country_code, commodity
            "#,
        )?;

        let defs = stmt
            .query_map([], map_def_row)?
            .collect::<SqliteResult<Vec<MarketingYearDefinition>>>()?;

        Ok(defs)
    }

    /// 统计定义行数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM marketing_year_def", [], |row| row.get(0))?;
        Ok(n)
    }
}

fn map_def_row(row: &Row<'_>) -> SqliteResult<MarketingYearDefinition> {
    let label_raw: String = row.get(4)?;

    Ok(MarketingYearDefinition {
        country_code: row.get(0)?,
        commodity: row.get(1)?,
        start_month: row.get::<_, i64>(2)? as u32,
        is_southern_hemisphere: row.get::<_, i64>(3)? != 0,
        label_format: label_raw.parse().unwrap_or(LabelFormat::SplitYear), // CHECK 约束保证不可达
        created_at: parse_timestamp(&row.get::<_, String>(5)?),
        updated_at: parse_timestamp(&row.get::<_, String>(6)?),
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| DateTime::<Utc>::from_timestamp(0, 0).unwrap_or_else(Utc::now))
}
