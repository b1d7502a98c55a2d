pub mod chomsky_normal_form;
pub mod context_free;
pub mod erasing;
pub mod fresh;
pub mod pipeline;
pub mod sample;
pub mod types;
pub mod unit;
pub mod useless;
