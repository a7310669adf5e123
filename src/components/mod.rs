pub mod dialog;
pub mod filter_bar;
pub mod status_bar;
pub mod tree;
