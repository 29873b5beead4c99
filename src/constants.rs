pub const APP_NAME: &str = "RemindMe";
pub const APP_LOGO: &str = "https://s3.varteqar.org/logos/remind-nbg.png";
pub const COMPANY_ADDRESS: &str = "123, Garki Expressway, Abuja, Nigeria";

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_SIZE: i64 = 20;

pub const FROM_NAME: &str = "Varteqar";
pub const FROM_BASE: &str = "RemindMe <no-reply@varteqar.com>";
pub const FROM_UPDATE: &str = "RemindMe <no-reply@updates.varteqar.com>";
pub const FROM_UPDATE_EMAIL: &str = "no-reply@updates.varteqar.com";

pub const OTP_LENGTH: usize = 6;
pub const OTP_EXPIRY_SECS: u64 = 60 * 60;
pub const OTP_EXPIRY_DISPLAY: &str = "60 minutes";
