use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, warn};

use reportgen_core::models::report::FileInfo;

/// Delete the generated files and, when left empty, the directories that
/// held them.
pub(crate) async fn remove_local_files(files: &[FileInfo]) {
    let mut dirs = BTreeSet::new();
    for file in files {
        match tokio::fs::remove_file(&file.local_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %file.local_path.display(), error = %e, "error removing report file");
            }
        }
        if let Some(dir) = file.local_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            dirs.insert(dir.to_path_buf());
        }
    }

    for dir in &dirs {
        remove_dir_if_empty(dir).await;
    }
}

async fn remove_dir_if_empty(dir: &Path) {
    if tokio::fs::remove_dir(dir).await.is_err() {
        debug!(path = %dir.display(), "report directory not removed");
    }
}
