pub mod export_table;

pub use export_table::ExportTable;
