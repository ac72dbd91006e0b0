// File-format adapters: tabular readers and writers for the survey sheets

pub mod table;
pub mod table_reader;
pub mod table_writer;

pub use table::{Cell, FileExt, Table};
pub use table_reader::read_table;
pub use table_writer::write_table;
