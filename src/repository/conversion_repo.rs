// ==========================================
// 农产品贸易参考数据核心 - 换算规则仓储
// ==========================================
// 职责: 管理 conversion_rule 表的装载与查询
// 红线: Repository 不含业务逻辑; 所有查询参数化
// 约束: 规则只增不删; 修正走 supersede, 整体退役走 retire
// ==========================================

use crate::domain::conversion::ConversionRule;
use crate::domain::types::{FlowDirection, SourceUnit};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// 日期列存储格式
const DATE_FMT: &str = "%Y-%m-%d";

// ==========================================
// ConversionRuleRepository - 换算规则仓储
// ==========================================

/// 换算规则仓储
pub struct ConversionRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ConversionRuleRepository {
    /// 创建新的换算规则仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 幂等 upsert 一条换算规则
    ///
    /// # 自然键
    /// - (hs_code_10, flow_direction, valid_from)
    /// - valid_from 以 IS 比较, NULL ("自始生效") 亦可幂等重放
    ///
    /// # 校验
    /// - conversion_factor 必须严格为正, 否则拒绝 (ValidationError)
    /// - hs_code_10 必须为 10 位数字串
    ///
    /// # 返回
    /// - Ok(()): 插入或更新成功 (同键同值重放不改变任何输出)
    pub fn upsert(&self, rule: &ConversionRule) -> RepositoryResult<()> {
        validate_rule(rule)?;

        let conn = self.get_conn()?;
        let valid_from = rule.valid_from.map(|d| d.format(DATE_FMT).to_string());
        let valid_to = rule.valid_to.map(|d| d.format(DATE_FMT).to_string());

        let existing_id: Option<i64> = conn
            .query_row(
                r#"
                SELECT id FROM conversion_rule
                WHERE hs_code_10 = ?1 AND flow_direction = ?2 AND valid_from IS ?3
                "#,
                params![rule.hs_code_10, rule.flow_direction.to_string(), valid_from],
                |row| row.get(0),
            )
            .optional()?;

        match existing_id {
            Some(id) => {
                conn.execute(
                    r#"
                    UPDATE conversion_rule SET
                        hs_code_6 = ?1, commodity_group = ?2, source_unit = ?3,
                        display_unit = ?4, conversion_factor = ?5, valid_to = ?6,
                        is_active = ?7, updated_at = ?8
                    WHERE id = ?9
                    "#,
                    params![
                        rule.hs_code_6,
                        rule.commodity_group,
                        rule.source_unit.to_string(),
                        rule.display_unit,
                        rule.conversion_factor,
                        valid_to,
                        rule.is_active as i64,
                        rule.updated_at.to_rfc3339(),
                        id,
                    ],
                )?;
            }
            None => {
                conn.execute(
                    r#"
                    INSERT INTO conversion_rule (
                        hs_code_10, hs_code_6, commodity_group, flow_direction,
                        source_unit, display_unit, conversion_factor,
                        valid_from, valid_to, is_active, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                    "#,
                    params![
                        rule.hs_code_10,
                        rule.hs_code_6,
                        rule.commodity_group,
                        rule.flow_direction.to_string(),
                        rule.source_unit.to_string(),
                        rule.display_unit,
                        rule.conversion_factor,
                        valid_from,
                        valid_to,
                        rule.is_active as i64,
                        rule.created_at.to_rfc3339(),
                        rule.updated_at.to_rfc3339(),
                    ],
                )?;
            }
        }

        Ok(())
    }

    /// 以修正系数替代当前生效规则
    ///
    /// # 规则
    /// 1. 找到 (hs_code_10, flow_direction) 当前开放窗口 (valid_to IS NULL) 的生效规则
    /// 2. 将其 valid_to 关闭为 effective_date 前一天 (原行保留, 历史日期仍可解析)
    /// 3. 以 effective_date 为 valid_from 插入修正后的新规则行
    ///
    /// # 失败
    /// - NotFound: 不存在开放窗口的生效规则
    /// - ValidationError: 修正系数非正
    pub fn supersede(
        &self,
        hs_code_10: &str,
        flow_direction: FlowDirection,
        effective_date: NaiveDate,
        new_factor: f64,
        new_source_unit: Option<SourceUnit>,
        new_display_unit: Option<&str>,
    ) -> RepositoryResult<()> {
        if new_factor <= 0.0 {
            return Err(RepositoryError::ValidationError(format!(
                "换算系数必须为正: {}",
                new_factor
            )));
        }

        let current = self
            .find_rules(hs_code_10, flow_direction)?
            .into_iter()
            .find(|r| r.is_active && r.valid_to.is_none())
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "ConversionRule".to_string(),
                id: format!("{}/{}", hs_code_10, flow_direction),
            })?;

        let closed_to = effective_date - Duration::days(1);
        let now = Utc::now();

        // 关闭旧窗口
        let closed = ConversionRule {
            valid_to: Some(closed_to),
            updated_at: now,
            ..current.clone()
        };
        self.upsert(&closed)?;

        // 插入修正行
        let corrected = ConversionRule {
            source_unit: new_source_unit.unwrap_or(current.source_unit),
            display_unit: new_display_unit
                .map(str::to_string)
                .unwrap_or_else(|| current.display_unit.clone()),
            conversion_factor: new_factor,
            valid_from: Some(effective_date),
            valid_to: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            ..current
        };
        self.upsert(&corrected)?;

        tracing::info!(
            hs_code_10,
            %flow_direction,
            %effective_date,
            new_factor,
            "换算规则已修正 (旧窗口关闭, 新规则生效)"
        );

        Ok(())
    }

    /// 整体退役一个代码 (所有历史行一并停用, 任何日期不再解析)
    pub fn retire(&self, hs_code_10: &str, flow_direction: FlowDirection) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE conversion_rule
            SET is_active = 0, updated_at = ?3
            WHERE hs_code_10 = ?1 AND flow_direction = ?2
            "#,
            params![hs_code_10, flow_direction.to_string(), Utc::now().to_rfc3339()],
        )?;
        Ok(updated)
    }

    /// 查询指定 (代码, 方向) 的全部规则行 (含历史窗口)
    pub fn find_rules(
        &self,
        hs_code_10: &str,
        flow_direction: FlowDirection,
    ) -> RepositoryResult<Vec<ConversionRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT hs_code_10, hs_code_6, commodity_group, flow_direction,
                   source_unit, display_unit, conversion_factor,
                   valid_from, valid_to, is_active, created_at, updated_at
            FROM conversion_rule
            WHERE hs_code_10 = ?1 AND flow_direction = ?2
            ORDER BY IFNULL(valid_from, '') ASC
            "#,
        )?;

        let rules = stmt
            .query_map(params![hs_code_10, flow_direction.to_string()], map_rule_row)?
            .collect::<SqliteResult<Vec<ConversionRule>>>()?;

        Ok(rules)
    }

    /// 列出全部规则行 (快照装载用)
    pub fn list_all(&self) -> RepositoryResult<Vec<ConversionRule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT hs_code_10, hs_code_6, commodity_group, flow_direction,
                   source_unit, display_unit, conversion_factor,
                   valid_from, valid_to, is_active, created_at, updated_at
            FROM conversion_rule
            ORDER BY hs_code_10, flow_direction, IFNULL(valid_from, '') ASC
            "#,
        )?;

        let rules = stmt
            .query_map([], map_rule_row)?
            .collect::<SqliteResult<Vec<ConversionRule>>>()?;

        Ok(rules)
    }

    /// 统计规则行数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM conversion_rule", [], |row| row.get(0))?;
        Ok(n)
    }
}

// ==========================================
// 行映射与校验
// ==========================================

fn map_rule_row(row: &Row<'_>) -> SqliteResult<ConversionRule> {
    let flow_raw: String = row.get(3)?;
    let unit_raw: String = row.get(4)?;

    Ok(ConversionRule {
        hs_code_10: row.get(0)?,
        hs_code_6: row.get(1)?,
        commodity_group: row.get(2)?,
        flow_direction: flow_raw
            .parse()
            .unwrap_or(FlowDirection::Import), // CHECK 约束保证不可达
        source_unit: unit_raw.parse().unwrap_or(SourceUnit::Kg),
        display_unit: row.get(5)?,
        conversion_factor: row.get(6)?,
        valid_from: parse_opt_date(row.get::<_, Option<String>>(7)?),
        valid_to: parse_opt_date(row.get::<_, Option<String>>(8)?),
        is_active: row.get::<_, i64>(9)? != 0,
        created_at: parse_timestamp(&row.get::<_, String>(10)?),
        updated_at: parse_timestamp(&row.get::<_, String>(11)?),
    })
}

fn parse_opt_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FMT).ok())
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| DateTime::<Utc>::from_timestamp(0, 0).unwrap_or_else(Utc::now))
}

fn validate_rule(rule: &ConversionRule) -> RepositoryResult<()> {
    if rule.conversion_factor <= 0.0 {
        return Err(RepositoryError::ValidationError(format!(
            "换算系数必须为正: hs_code_10={}, factor={}",
            rule.hs_code_10, rule.conversion_factor
        )));
    }

    if rule.hs_code_10.len() != 10 || !rule.hs_code_10.chars().all(|c| c.is_ascii_digit()) {
        return Err(RepositoryError::FieldValueError {
            field: "hs_code_10".to_string(),
            message: format!("必须为 10 位数字串: {}", rule.hs_code_10),
        });
    }

    if let (Some(from), Some(to)) = (rule.valid_from, rule.valid_to) {
        if to < from {
            return Err(RepositoryError::FieldValueError {
                field: "valid_to".to_string(),
                message: format!("生效窗口颠倒: {} > {}", from, to),
            });
        }
    }

    Ok(())
}
