pub mod sync;
pub mod url;
