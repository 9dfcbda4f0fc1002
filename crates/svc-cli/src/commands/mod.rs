pub mod completions;
pub mod connect;
pub mod login_as;
pub mod logout;
pub mod request;
pub mod set_token;
pub mod url;
pub mod whoami;
