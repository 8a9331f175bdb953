pub mod camera;
pub mod detector;
pub mod injector;
pub mod screen;
