pub mod client;
pub mod file;
pub mod society;
pub mod user;

pub use client::{ClientDraft, ClientExternal, RegisterClientRequest};
pub use file::{NewFile, StoredFile, UploadFileRequest};
pub use society::{Society, SocietyDraft, SocietyRequest};
pub use user::{LoginRequest, LoginResponse, Principal, User};
