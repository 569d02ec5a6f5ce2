// Test support - only compiled for test builds
pub mod utils;
