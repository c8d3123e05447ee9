pub mod textfile;
pub mod writer;

pub use textfile::render;
pub use writer::write_textfile;
