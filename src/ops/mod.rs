pub mod check;
pub mod conflict;
pub mod export;
pub mod family_ops;
pub mod import;
pub mod mode_ops;
pub mod prompt;
pub mod redundancy;
pub mod search;
pub mod tokens;
