// ==========================================
// 农产品贸易参考数据核心 - 历史国家映射仓储
// ==========================================
// 职责: 管理 country_mapping 表的装载与查询
// 红线: 仅追加; 新的解体事件以插入新行建模, 不改写既有行
// ==========================================

use crate::domain::country::CountryMapping;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// 日期列存储格式
const DATE_FMT: &str = "%Y-%m-%d";

// ==========================================
// CountryMappingRepository - 历史国家映射仓储
// ==========================================

/// 历史国家映射仓储
pub struct CountryMappingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CountryMappingRepository {
    /// 创建新的历史国家映射仓储实例
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

    /// 幂等 upsert 一条历史国家映射
    ///
    /// # 自然键
    /// - (historical_code, current_code, dissolution_date)
    pub fn upsert(&self, mapping: &CountryMapping) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO country_mapping (
                historical_code, historical_name, current_code, current_name,
                dissolution_date, is_primary_successor, region, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(historical_code, current_code, dissolution_date) DO UPDATE SET
                historical_name = ?2,
                current_name = ?4,
                is_primary_successor = ?6,
                region = ?7
            "#,
            params![
                mapping.historical_code,
                mapping.historical_name,
                mapping.current_code,
                mapping.current_name,
                mapping.dissolution_date.format(DATE_FMT).to_string(),
                mapping.is_primary_successor as i64,
                mapping.region,
                mapping.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// 查询指定历史代码的全部映射行 (主继承国在前)
    pub fn find_by_historical_code(
        &self,
        historical_code: &str,
    ) -> RepositoryResult<Vec<CountryMapping>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT historical_code, historical_name, current_code, current_name,
                   dissolution_date, is_primary_successor, region, created_at
            FROM country_mapping
            WHERE historical_code = ?1
            ORDER BY is_primary_successor DESC, current_code ASC
            "#,
        )?;

        let mappings = stmt
            .query_map(params![historical_code], map_mapping_row)?
            .collect::<SqliteResult<Vec<CountryMapping>>>()?;

        Ok(mappings)
    }

    /// 列出全部映射行 (快照装载用)
    pub fn list_all(&self) -> RepositoryResult<Vec<CountryMapping>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT historical_code, historical_name, current_code, current_name,
                   dissolution_date, is_primary_successor, region, created_at
            FROM country_mapping
            ORDER BY historical_code, is_primary_successor DESC, current_code ASC
            "#,
        )?;

        let mappings = stmt
            .query_map([], map_mapping_row)?
            .collect::<SqliteResult<Vec<CountryMapping>>>()?;

        Ok(mappings)
    }

    /// 统计映射行数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM country_mapping", [], |row| row.get(0))?;
        Ok(n)
    }
}

fn map_mapping_row(row: &Row<'_>) -> SqliteResult<CountryMapping> {
    Ok(CountryMapping {
        historical_code: row.get(0)?,
        historical_name: row.get(1)?,
        current_code: row.get(2)?,
        current_name: row.get(3)?,
        dissolution_date: NaiveDate::parse_from_str(&row.get::<_, String>(4)?, DATE_FMT)
            .unwrap_or_default(),
        is_primary_successor: row.get::<_, i64>(5)? != 0,
        region: row.get(6)?,
        created_at: parse_timestamp(&row.get::<_, String>(7)?),
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| DateTime::<Utc>::from_timestamp(0, 0).unwrap_or_else(Utc::now))
}
