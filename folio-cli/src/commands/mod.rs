pub mod build_cmd;
pub mod preview_cmd;
pub mod profile_cmd;
