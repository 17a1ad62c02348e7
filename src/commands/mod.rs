pub mod extract;
pub mod run;
pub mod serve;
pub mod status;
