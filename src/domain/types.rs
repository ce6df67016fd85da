// ==========================================
// 农产品贸易参考数据核心 - 领域类型定义
// ==========================================
// 职责: 定义贸易方向、来源单位、年度标签格式等基础枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库/种子文件一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 贸易方向 (Flow Direction)
// ==========================================
// 同一 HS 代码在进口/出口方向可使用不同换算规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowDirection {
    Import, // 进口
    Export, // 出口
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowDirection::Import => write!(f, "IMPORT"),
            FlowDirection::Export => write!(f, "EXPORT"),
        }
    }
}

impl FromStr for FlowDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IMPORT" => Ok(FlowDirection::Import),
            "EXPORT" => Ok(FlowDirection::Export),
            other => Err(format!("未知贸易方向: {}", other)),
        }
    }
}

// ==========================================
// 来源单位 (Source Unit)
// ==========================================
// 换算单位约定严格按 10 位 HS 代码区分:
// 同一商品组的相邻代码可能分别以 KG / MT 上报
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceUnit {
    Kg, // 千克
    Mt, // 公吨
}

impl fmt::Display for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceUnit::Kg => write!(f, "KG"),
            SourceUnit::Mt => write!(f, "MT"),
        }
    }
}

impl FromStr for SourceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KG" => Ok(SourceUnit::Kg),
            "MT" => Ok(SourceUnit::Mt),
            other => Err(format!("未知来源单位: {}", other)),
        }
    }
}

// ==========================================
// 年度标签格式 (Label Format)
// ==========================================
// SPLIT_YEAR: "2024/25" (跨年市场年度)
// SINGLE_YEAR: "2024"   (1月起始的自然年市场年度)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelFormat {
    SplitYear,
    SingleYear,
}

impl fmt::Display for LabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelFormat::SplitYear => write!(f, "SPLIT_YEAR"),
            LabelFormat::SingleYear => write!(f, "SINGLE_YEAR"),
        }
    }
}

impl FromStr for LabelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SPLIT_YEAR" => Ok(LabelFormat::SplitYear),
            "SINGLE_YEAR" => Ok(LabelFormat::SingleYear),
            other => Err(format!("未知年度标签格式: {}", other)),
        }
    }
}
