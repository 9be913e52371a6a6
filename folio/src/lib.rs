pub mod app;
pub mod cli;
pub mod commands;

pub use app::Folio;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_log_filter(0, false), "warn");
        assert_eq!(default_log_filter(2, false), "debug");
        assert_eq!(default_log_filter(7, false), "trace");
        assert_eq!(default_log_filter(3, true), "error");
    }
}
