mod fetcher;
mod handler;
mod model;

pub use fetcher::StatusFetcher;
pub use handler::get_status;
pub use model::{PNR_LENGTH, Pnr, StatusQuery, extract_status};
