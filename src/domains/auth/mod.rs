//! Email OTP, magic-link and verification-email flows over secondary storage.

pub mod hooks;
pub mod mailer;
pub mod model;
pub mod rest;
pub mod service;
pub mod storage;
