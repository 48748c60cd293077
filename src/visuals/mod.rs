pub mod colors;
pub mod maps;
pub mod page;
