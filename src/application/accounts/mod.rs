//! Account administration use-cases.

pub mod paging;
pub mod params;
pub mod reference;
pub mod service;
pub mod validation;
pub mod views;

pub use paging::per_page_for_screen_size;
pub use params::{permit, permitted_attributes, AccountParams};
pub use service::{AccountAdminService, AccountSettings, ListAccountsQuery, Submission};
pub use views::{AccountDraft, AccountForm, AccountList, AccountSummary, PageInfo};
