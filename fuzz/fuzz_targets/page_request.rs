#![no_main]

use libfuzzer_sys::fuzz_target;
use querylog::config::LoggerConfig;
use querylog::logger::QueryLogger;

fuzz_target!(|data: &[u8]| {
    // Arbitrary JSON must either decode to a page or be dropped, never panic
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(logger) = QueryLogger::new(LoggerConfig::default()) {
            logger.log_query("fuzz", "SELECT 1", 1.0, &value);
            let _ = logger.handle_page_request(&value);
        }
    }
});
