/*!
This crate contains small utilities shared by the other suinz crates.
*/

pub mod table;
