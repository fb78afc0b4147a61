// Writing Tools Core Services

pub mod text_processor;
pub mod config_store;
pub mod providers;
pub mod detection;
pub mod tools;

pub use text_processor::*;
pub use config_store::*;
pub use providers::*;

pub use detection::{
    analyze_text,
    classify,
    detect_text,
    highlight_matches,
};
