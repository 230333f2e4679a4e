//! Line-level edits of the shared credentials file.
//!
//! The file is not parsed: any line containing the key-ID (or secret) marker
//! is replaced wholesale. Everything else is kept byte for byte.

use crate::constants::{KEY_ID_MARKER, SECRET_MARKER};
use crate::core::error::KeyError;
use std::fs;
use std::io::Write;
use std::path::Path;
use zeroize::Zeroizing;

/// Key ID from the first key-ID line, split on the first `=`.
pub fn read_key_id(path: &Path) -> Result<Option<String>, KeyError> {
    let content = fs::read_to_string(path)
        .map_err(|e| KeyError::io(format!("read credentials file {}", path.display()), e))?;
    Ok(content
        .lines()
        .filter(|line| line.contains(KEY_ID_MARKER))
        .find_map(|line| line.split_once('='))
        .map(|(_, value)| value.trim().to_string()))
}

/// How the file's configured key differs from `active`, if it does.
pub fn key_id_mismatch(path: &Path, active: &str) -> Option<String> {
    match read_key_id(path) {
        Ok(Some(id)) if id == active => None,
        Ok(Some(id)) => Some(format!(
            "credentials file holds key {} but the service's active key is {}",
            id, active
        )),
        Ok(None) => Some(format!(
            "credentials file {} has no {} line",
            path.display(),
            KEY_ID_MARKER
        )),
        Err(e) => Some(format!("cannot read configured key id: {}", e)),
    }
}

/// Replace both credential lines in `content`.
pub fn rewrite(content: &str, key_id: &str, secret: &str) -> Zeroizing<String> {
    let mut out = Zeroizing::new(String::with_capacity(content.len() + secret.len()));
    for segment in content.split_inclusive('\n') {
        let (body, ending) = split_line_ending(segment);
        if body.contains(KEY_ID_MARKER) {
            out.push_str(&format!("{} = {}", KEY_ID_MARKER, key_id));
        } else if body.contains(SECRET_MARKER) {
            out.push_str(SECRET_MARKER);
            out.push_str(" = ");
            out.push_str(secret);
        } else {
            out.push_str(body);
        }
        out.push_str(ending);
    }
    out
}

/// Rewrite the credentials file in place with a new key pair.
///
/// The file is read fully, then replaced through a temp file in the same
/// directory. Permission bits are carried over. No locking.
pub fn update(path: &Path, key_id: &str, secret: &str) -> Result<(), KeyError> {
    let content = Zeroizing::new(
        fs::read_to_string(path)
            .map_err(|e| KeyError::io(format!("open credentials file {}", path.display()), e))?,
    );
    let permissions = fs::metadata(path)
        .map_err(|e| KeyError::io(format!("stat credentials file {}", path.display()), e))?
        .permissions();

    let updated = rewrite(&content, key_id, secret);

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".credentials-")
        .tempfile_in(dir)
        .map_err(|e| KeyError::io(format!("create temp file in {}", dir.display()), e))?;
    tmp.write_all(updated.as_bytes())
        .and_then(|_| tmp.flush())
        .map_err(|e| KeyError::io("write updated credentials", e))?;
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| KeyError::io("set permissions on updated credentials", e))?;
    tmp.persist(path).map_err(|e| {
        KeyError::io(format!("replace credentials file {}", path.display()), e.error)
    })?;
    Ok(())
}

fn split_line_ending(segment: &str) -> (&str, &str) {
    if let Some(body) = segment.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = segment.strip_suffix('\n') {
        (body, "\n")
    } else {
        (segment, "")
    }
}
