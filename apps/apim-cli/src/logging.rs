use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise `-v` picks the level for the SDK crates.
fn filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!(
            "warn,apim={level},armapimanagement={level},armkit_runtime={level},armkit_http={level},armkit_identity={level}"
        ))
    })
}

/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init(verbose: u8, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr);
    if json {
        builder.json().with_current_span(true).init();
    } else {
        builder.compact().with_target(false).init();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_maps_to_sdk_level() {
        temp_env::with_var_unset("RUST_LOG", || {
            assert!(filter(0).to_string().contains("armkit_http=warn"));
            assert!(filter(2).to_string().contains("armapimanagement=debug"));
            assert!(filter(7).to_string().contains("apim=trace"));
        });
    }

    #[test]
    fn test_filter_names_the_binary_target() {
        let crate_target = module_path!().split("::").next().unwrap();
        assert_eq!(crate_target, "apim");
        temp_env::with_var_unset("RUST_LOG", || {
            assert!(
                filter(1)
                    .to_string()
                    .split(',')
                    .any(|d| d == format!("{crate_target}=info"))
            );
        });
    }

    #[test]
    fn test_rust_log_overrides_verbosity() {
        temp_env::with_var("RUST_LOG", Some("armkit_runtime=trace"), || {
            assert_eq!(filter(1).to_string(), "armkit_runtime=trace");
        });
    }
}
