pub mod engagement;
pub mod export;
pub mod gemini;
pub mod init;
pub mod weather;
