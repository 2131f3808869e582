/// 缓存键生成

// PNR 状态缓存前缀
pub const PNR_STATUS_CACHE_PREFIX: &str = "pnr_status_";

pub fn pnr_status_key(pnr: &str) -> String {
    format!("{}{}", PNR_STATUS_CACHE_PREFIX, pnr)
}
