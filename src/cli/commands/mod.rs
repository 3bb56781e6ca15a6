pub mod audit_cmd;
pub mod completions;
pub mod decrypt;
pub mod encrypt;
pub mod hash;
pub mod keygen;
pub mod token;
