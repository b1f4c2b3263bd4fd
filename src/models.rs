pub mod member;
pub mod partner;
pub mod project;
pub mod store;
pub mod work_time;
