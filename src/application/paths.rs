//! Redirect targets shared by the admin controllers.

pub const USERS_PATH: &str = "/admin/users";
pub const ADMIN_PAGES_PATH: &str = "/admin/pages";
pub const ADMIN_DASHBOARD_PATH: &str = "/admin/dashboard";
pub const LOGIN_PATH: &str = "/admin/login";
pub const ROOT_PATH: &str = "/";
