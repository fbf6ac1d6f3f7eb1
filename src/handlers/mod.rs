pub mod logs;
pub mod scan;

pub use logs::FoodLogBook;
pub use scan::ScanHandler;
