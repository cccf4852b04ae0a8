//! Policy/value networks, checkpointing and training (tch-rs).

pub mod encoding;
pub mod manager;
pub mod model_io;
pub mod policy_value_net;
pub mod res_net_block;
pub mod trainer;

pub use manager::NetworkManager;
pub use policy_value_net::{PolicyNet, ValueNet};
