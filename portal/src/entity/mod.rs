pub mod equipment;
pub mod maintenance_request;
pub mod note;
pub mod team;
pub mod team_member;
pub mod user;
pub mod work_center;
pub mod work_center_alternative;
