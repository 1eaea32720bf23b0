pub const TEASER_DURATION_MIN_SECONDS: i32 = 5;
pub const TEASER_DURATION_MAX_SECONDS: i32 = 300;
