//! Domain layer: accounts, errors and the ports the application talks through.

pub mod error;
pub mod ports;
pub mod user;

pub use error::{DomainError, DomainResult, FieldErrors};
pub use ports::{
    Action, Actor, AuthorizationPort, NotificationError, NotificationPort, Resource, SessionGrant,
    SessionPort,
};
pub use user::{
    roles_from_str, roles_to_string, CreateUserDto, Gender, GetUserDto, SortDirection, SortField,
    SortOrder, UpdateUserDto, User, UserRole, UserRepositoryInterface,
};
