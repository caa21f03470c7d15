mod controller;
mod policy;
mod state;

pub use controller::SessionController;
pub use policy::ProctorPolicy;
pub use state::{Effect, SessionPhase, SessionState, ViolationWarning};
