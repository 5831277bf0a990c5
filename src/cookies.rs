// src/cookies.rs
//! Cookies: the [`Cookie`] record and the per-session [`SessionJar`].

mod cookie;
mod jar;

pub use cookie::Cookie;
pub use jar::SessionJar;
