use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;

pub const PNR_LENGTH: usize = 10;

// 页面脚本中的 `data = {...};` 赋值，允许跨行，取第一个 `};` 为止
static EMBEDDED_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\bdata\s*=\s*(\{.*?\})\s*;").expect("embedded data pattern is valid")
});

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub pnr: Option<String>,
}

/// 已校验的 10 位数字 PNR
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pnr(String);

impl Pnr {
    pub fn parse(raw: &str) -> Result<Self, FetchError> {
        if raw.len() == PNR_LENGTH && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Pnr(raw.to_string()))
        } else {
            Err(FetchError::InvalidInput)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pnr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 从页面 HTML 中取出内嵌的状态 JSON
pub fn extract_status(html: &str) -> Result<Value, FetchError> {
    let captures = EMBEDDED_DATA.captures(html).ok_or(FetchError::NotFound)?;
    let blob = captures.get(1).map(|m| m.as_str()).ok_or(FetchError::NotFound)?;

    Ok(serde_json::from_str(blob)?)
}
