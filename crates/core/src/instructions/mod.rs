mod fill_vault;

pub use fill_vault::*;
