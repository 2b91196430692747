/// Router Module Index
///
/// Organizes the application's routing logic into access-segregated
/// modules. Access control is applied where it is most enforceable: the
/// authenticated group carries a middleware layer, while admin-facing
/// content routes rely on the authorization gate inside the content
/// service (so the refusal decision and its tests live in one place).

/// Routes accessible to all clients (anonymous or logged-in).
pub mod public;

/// Routes behind the authentication middleware: a valid session required.
pub mod authenticated;

/// Content-mutating routes restricted to the administrator.
pub mod admin;
