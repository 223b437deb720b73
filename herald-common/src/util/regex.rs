use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref USER_MENTION: Regex = Regex::new(r"<@!?(\d+)>").unwrap();
    pub static ref CHANNEL_MENTION: Regex = Regex::new(r"<#(\d+)>").unwrap();
    pub static ref CUSTOM_EMOJI: Regex = Regex::new(r"<a?:(\w+):(\d+)>").unwrap();
    pub static ref URL: Regex = Regex::new(r"(https?://\S+)").unwrap();
    pub static ref TIME_STRING: Regex = Regex::new("(\\d+)([smhd])").unwrap();
}
