#[cfg(test)]
mod pipeline_test;
pub mod reader;
pub mod sample;
pub mod schedule;
pub mod sink;
pub mod source;
