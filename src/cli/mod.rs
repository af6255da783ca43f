//! Command workflows shared by the binary and the tests

pub mod orchestration;
