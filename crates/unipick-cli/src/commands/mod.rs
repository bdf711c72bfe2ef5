pub mod prepare;
pub mod recommend;
