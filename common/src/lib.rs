//! Shared utilities for the iacscan workspace: an insertion-ordered string
//! set, atomic file replacement, relative path normalisation, git
//! repository discovery, and small JSON and text helpers.

pub mod atomic;
pub mod git;
pub mod json;
pub mod path;
pub mod string_set;
pub mod text;

pub use atomic::{AtomicFileWriter, write_atomic};
pub use git::{find_git_dir, find_repo_root};
pub use json::remove_elements_if;
pub use path::{parent_dir, relative_slash_path, to_slash};
pub use string_set::StringSet;
pub use text::truncate_right;
