pub mod allocator;
pub mod api;
pub mod calibration;
pub mod config;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod mapping;
pub mod offsets;
pub mod quality;
// cmd and reports belong to the binary (main.rs).
