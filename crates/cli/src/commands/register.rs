use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use imagepress_core::error::Error;
use imagepress_core::Pipeline;

/// Register each path, reporting the ones that could not be added.
/// Exits non-zero if any path was rejected.
pub fn run(pipeline: &Pipeline, paths: &[PathBuf]) -> Result<ExitCode> {
    let mut rejected = 0;
    for path in paths {
        match pipeline.register(path) {
            Ok(image) => println!("Registered #{}: {}", image.id, image.original_path.display()),
            Err(Error::SourceNotFound(p)) => {
                eprintln!(
                    "Not found under {}: {}",
                    pipeline.config().content_root.display(),
                    p.display()
                );
                rejected += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if rejected > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
