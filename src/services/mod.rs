pub mod auth;
pub mod describe;
pub mod group_watch;
pub mod mailer;
pub mod membership;
pub mod otp;
pub mod quiz;
pub mod textgen;
pub mod watch_history;
