pub mod asset;
pub mod maintenance_history;
pub mod maintenance_parts_used;
pub mod maintenance_point;
pub mod maintenance_point_image;
pub mod part;
pub mod parts_transaction;
pub mod user;
