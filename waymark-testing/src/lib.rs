//! Testing utilities for Waymark action models.
//!
//! ## Features
//!
//! - **Builders** - Controller, method and parameter shapes
//! - **TestHost** - Discovery through descriptor publication in one call
//! - **Assertions** - Route keys, templates and route values
//! - **Recording doubles** - Provider call order and change sources
//!
//! ## Quick Start
//!
//! ```
//! use waymark_testing::*;
//!
//! let host = TestHost::builder()
//!     .controller(
//!         ControllerTypeBuilder::new("Orders")
//!             .route("api/[controller]")
//!             .action(MethodBuilder::new("Get").get("{id}").param(ParameterBuilder::int("id")))
//!             .build(),
//!     )
//!     .build();
//!
//! let descriptors = host.descriptors().unwrap();
//! assert_template(expect_descriptor(&descriptors, "Orders.Get"), "api/Orders/{id}");
//! assert_route_keys_uniform(&descriptors);
//! ```

mod assertions;
mod builders;
mod mock;
mod test_host;

pub use assertions::{
    assert_conventional, assert_route_keys_uniform, assert_route_value, assert_template,
    expect_descriptor, find_descriptor,
};
pub use builders::{ControllerTypeBuilder, MethodBuilder, ParameterBuilder};
pub use mock::{CallLog, ManualChangeSource, RecordingProvider};
pub use test_host::{DEFAULT_PART, TestHost, TestHostBuilder};
