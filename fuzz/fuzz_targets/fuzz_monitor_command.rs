#![no_main]
use libfuzzer_sys::fuzz_target;
use lift_core::OverrideCommand;

fuzz_target!(|data: &str| {
    // Monitor input arrives as untrusted JSON lines; rejecting is fine, panicking is not.
    if let Ok(cmd) = serde_json::from_str::<OverrideCommand>(data) {
        let _ = serde_json::to_string(&cmd);
    }
});
