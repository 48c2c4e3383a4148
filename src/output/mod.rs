//! Tabular outputs of the scaling report: CSV files and console tables.

pub mod csv;
pub mod table;

pub use self::csv::write_group_csvs;
pub use self::table::comparison_tables;
