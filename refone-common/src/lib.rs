pub mod side;

pub mod color;

pub mod bundles;

pub mod match_snapshot;

pub mod config;

pub mod sync;

pub mod stats;

pub mod drawing_support {
    use core::time::Duration;

    /// Formats a duration as `MM:SS`. Minutes keep growing past 99 instead of wrapping.
    pub fn time_string(time: Duration) -> String {
        secs_to_time_string(time.as_secs())
    }

    pub fn secs_to_time_string(secs: u64) -> String {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

}
