///! Backend feature modules
pub mod astro;
pub mod catalog;
pub mod wiki;
