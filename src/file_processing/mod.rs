pub mod packager;
pub mod reader;
pub mod writer;
