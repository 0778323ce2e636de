//! CLI command implementations.

pub mod resolve;

use anyhow::Result;

pub fn validate(path: &str) -> Result<()> {
    match buildspec_config::load_descriptor(path) {
        Ok(descriptor) => {
            println!(
                "Descriptor is valid: {} build type(s), {} dependencies",
                descriptor.build_types.len(),
                descriptor.dependencies.len()
            );
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}
