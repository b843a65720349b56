//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Site;

/// Remove the public directory and anything an interrupted build left
pub fn run(site: &Site) -> Result<()> {
    for dir in [site.public_dir.clone(), site.staging_dir(), site.retired_dir()] {
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            tracing::info!("Deleted: {:?}", dir);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_output_and_staging() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::create_dir_all(site.public_dir.join("post")).unwrap();
        fs::create_dir_all(site.staging_dir()).unwrap();

        run(&site).unwrap();
        assert!(!site.public_dir.exists());
        assert!(!site.staging_dir().exists());

        // Nothing to clean is fine
        run(&site).unwrap();
    }
}
