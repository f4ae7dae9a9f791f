pub mod extract;
pub mod weatherlink;
