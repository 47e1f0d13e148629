//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module       | Commands handled |
//! |--------------|------------------|
//! | `stages`     | `Stages`         |
//! | `board`      | `Board`          |
//! | `move_card`  | `Move`           |
//! | `serve`      | `Serve`          |
//! | `config`     | `Config`         |

pub mod board;
pub mod config;
pub mod move_card;
pub mod serve;
pub mod stages;

pub use board::cmd_board;
pub use config::cmd_config;
pub use move_card::cmd_move;
pub use serve::cmd_serve;
pub use stages::cmd_stages;
