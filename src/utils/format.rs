/// Renders elapsed seconds as `"Xm Ys"`, e.g. `125` -> `"2m 5s"`.
pub fn format_duration(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes}m {seconds}s")
}
