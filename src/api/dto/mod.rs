pub mod layout;
pub mod login;

pub use layout::LayoutData;
pub use login::LoginPageData;
