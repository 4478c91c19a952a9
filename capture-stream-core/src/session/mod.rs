pub mod acquisition;
pub mod controller;
pub mod devices;
pub mod handle;
pub mod listeners;
pub mod mute;
