pub mod background;
pub mod coords;
