//! Features: the tabulation engine and its reference clients

pub mod ifds_ide;
pub mod linear_constant;
pub mod taint;
