/// Router Module Index
///
/// Routes are grouped by the gates in front of them. `create_router` layers
/// each group and merges them; paths shared between groups (e.g. `/menu`)
/// end up with per-method gates.

/// Routes open to anonymous callers.
pub mod public;

/// Routes behind the identity gate (valid bearer token).
pub mod authenticated;

/// Routes behind the identity gate and then the admin gate.
pub mod admin;
