//! Domain ports (hexagonal architecture boundaries)
//!
//! Ports define the interfaces between the domain core and the outside world.
//! These are trait contracts that external adapters implement.

pub mod authorization;
pub mod notification;
pub mod session;

pub use authorization::{Action, Actor, AuthorizationPort, Resource};
pub use notification::{NotificationError, NotificationPort};
pub use session::{SessionGrant, SessionPort};
