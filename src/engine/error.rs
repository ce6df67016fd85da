// ==========================================
// 农产品贸易参考数据核心 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 市场年度/国家解析为全函数, 只有换算解析会失败
// ==========================================

use crate::domain::types::{FlowDirection, LabelFormat};
use chrono::NaiveDate;
use thiserror::Error;

/// 解析器错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolverError {
    /// 无匹配换算规则 (代码未知, 或生效窗口不覆盖指定日期)
    #[error("未知商品代码: hs_code_10={hs_code_10}, flow={flow_direction}, as_of={as_of}")]
    UnknownCommodityCode {
        hs_code_10: String,
        flow_direction: FlowDirection,
        as_of: NaiveDate,
    },

    /// 非法数量 (负值)
    #[error("非法数量: {quantity} (不允许负值)")]
    InvalidQuantity { quantity: f64 },

    /// 同一时点命中多条生效规则
    ///
    /// 属于装载数据缺陷, 视为致命错误, 绝不静默任选一条
    #[error("换算规则歧义: hs_code_10={hs_code_10}, flow={flow_direction}, as_of={as_of} 命中 {matched} 条生效规则")]
    AmbiguousConversionRule {
        hs_code_10: String,
        flow_direction: FlowDirection,
        as_of: NaiveDate,
        matched: usize,
    },
}

/// Result 类型别名
pub type ResolverResult<T> = Result<T, ResolverError>;

/// 快照构建错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// 非正换算系数 (参考数据不变式)
    #[error("非正换算系数: hs_code_10={hs_code_10}, factor={factor}")]
    InvalidConversionFactor { hs_code_10: String, factor: f64 },

    /// 市场年度起始月越界
    #[error("起始月越界: country={country_code}, commodity={commodity}, start_month={start_month}")]
    InvalidStartMonth {
        country_code: String,
        commodity: String,
        start_month: u32,
    },

    /// 年度标签格式与起始月不一致 (单年标签限 1 月起始的自然年年度)
    #[error("年度标签格式不一致: country={country_code}, commodity={commodity}, start_month={start_month}, label_format={label_format}")]
    InconsistentLabelFormat {
        country_code: String,
        commodity: String,
        start_month: u32,
        label_format: LabelFormat,
    },
}
