pub mod block_explorer;
pub mod cryptoid;
