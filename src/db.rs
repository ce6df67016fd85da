// ==========================================
// 农产品贸易参考数据核心 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 统一参考数据表建表语句（参考数据只经离线种子/迁移路径写入）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明：
/// - 参考数据表结构由 `init_schema` 统一创建（幂等）。
/// - 版本号用于**提示/告警**（不做自动迁移），避免静默在旧库上运行导致隐性错误。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化参考数据表结构（幂等）
///
/// # 表
/// - conversion_rule: 商品单位换算规则（按 10 位 HS 代码 + 贸易方向 + 生效窗口版本化）
/// - marketing_year_def: 市场年度定义（按 国家代码 + 商品 唯一）
/// - country_mapping: 历史国家代码继承映射（仅追加）
/// - schema_version: 结构版本记录
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS conversion_rule (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hs_code_10 TEXT NOT NULL,
            hs_code_6 TEXT NOT NULL,
            commodity_group TEXT NOT NULL,
            flow_direction TEXT NOT NULL CHECK (flow_direction IN ('IMPORT', 'EXPORT')),
            source_unit TEXT NOT NULL CHECK (source_unit IN ('KG', 'MT')),
            display_unit TEXT NOT NULL,
            conversion_factor REAL NOT NULL CHECK (conversion_factor > 0),
            valid_from TEXT,
            valid_to TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- 自然键: (hs_code_10, flow_direction, valid_from)
        -- valid_from 为 NULL 表示"自始生效"，以 IFNULL 折叠保证幂等 upsert
        CREATE UNIQUE INDEX IF NOT EXISTS idx_conversion_rule_natural_key
            ON conversion_rule (hs_code_10, flow_direction, IFNULL(valid_from, ''));

        CREATE INDEX IF NOT EXISTS idx_conversion_rule_lookup
            ON conversion_rule (hs_code_10, flow_direction, is_active);

        CREATE TABLE IF NOT EXISTS marketing_year_def (
            country_code TEXT NOT NULL,
            commodity TEXT NOT NULL,
            start_month INTEGER NOT NULL CHECK (start_month BETWEEN 1 AND 12),
            is_southern_hemisphere INTEGER NOT NULL DEFAULT 0,
            label_format TEXT NOT NULL DEFAULT 'SPLIT_YEAR'
                CHECK (label_format IN ('SPLIT_YEAR', 'SINGLE_YEAR')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (country_code, commodity)
        );

        CREATE TABLE IF NOT EXISTS country_mapping (
            historical_code TEXT NOT NULL,
            historical_name TEXT NOT NULL,
            current_code TEXT NOT NULL,
            current_name TEXT NOT NULL,
            dissolution_date TEXT NOT NULL,
            is_primary_successor INTEGER NOT NULL DEFAULT 0,
            region TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (historical_code, current_code, dissolution_date)
        );

        CREATE INDEX IF NOT EXISTS idx_country_mapping_historical
            ON country_mapping (historical_code);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
