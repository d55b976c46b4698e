pub mod lit;
