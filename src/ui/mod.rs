pub mod board;
pub mod icons;

pub use board::{format_amount, render_board, render_result, render_stages};
