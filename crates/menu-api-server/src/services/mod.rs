pub mod excel;
pub mod seed;

pub use excel::ExcelService;
