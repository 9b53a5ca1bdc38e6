mod reward_pool;

pub use reward_pool::*;
