//! Authentication by login code.
//!
//! [`SessionGate`] moves through [`GateState`]s as a code is validated:
//! `LoggedOut → Validating → Authenticated | RejectedCode | NetworkError`.

mod gate;
mod state;

pub use gate::SessionGate;
pub use state::GateState;
