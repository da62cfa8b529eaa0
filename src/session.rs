pub mod camera;
pub mod controller;
pub mod countdown;
pub mod layout;
pub mod notify;
