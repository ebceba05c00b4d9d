pub mod gui;
pub mod run;
