use std::sync::LazyLock;

use crate::build_info::BUILD_INFO;

const SHORT_SHA_LEN: usize = 8;

/// Image version followed by the short commit hash, e.g. `v0.3.1-1a2b3c4d`.
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    format_version(
        env!("IMAGE_VERSION"),
        BUILD_INFO.commit_sha1,
        BUILD_INFO.git_dirty,
    )
});

fn format_version(image_version: &str, commit_sha1: Option<&str>, dirty: bool) -> String {
    let sha = commit_sha1
        .map(|sha| &sha[..sha.len().min(SHORT_SHA_LEN)])
        .unwrap_or("unknown");
    let suffix = if dirty { "-dirty" } else { "" };
    format!("{image_version}-{sha}{suffix}")
}
