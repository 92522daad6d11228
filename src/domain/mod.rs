//! Domain layer: validated value types with invariants (no I/O).

mod validation;
mod value;

pub use validation::ValidationError;
pub use value::{AccessKey, ApiVersion, CallConnectionId, E164Number, Endpoint};
