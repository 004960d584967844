mod role_policy;

pub use role_policy::RolePolicy;
