// Each integration test binary compiles its own copy of these helpers.
#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod wiremock_helpers;
