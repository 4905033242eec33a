use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Lower-case hex digest, the form `--report-json` and drift checks print.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .flat_map(|b| [HEX_DIGITS[usize::from(b >> 4)], HEX_DIGITS[usize::from(b & 0x0f)]])
        .map(char::from)
        .collect()
}

/// Rebuilds every object with its keys in byte order, depth first.
fn sort_keys(v: &mut Value) {
    match v {
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        Value::Object(map) => {
            let mut sorted: BTreeMap<String, Value> = std::mem::take(map).into_iter().collect();
            sorted.values_mut().for_each(sort_keys);
            map.extend(sorted);
        }
        _ => {}
    }
}

/// Sorted-key, two-space pretty JSON with a trailing newline.
pub fn canonical_pretty_json_bytes(value: &Value) -> Result<Vec<u8>> {
    let mut v = value.clone();
    sort_keys(&mut v);
    let mut out = serde_json::to_vec_pretty(&v)?;
    if out.last() != Some(&b'\n') {
        out.push(b'\n');
    }
    Ok(out)
}

/// Compact sorted-key JSON; the bytes a description hash is taken over.
pub fn canonical_json_bytes(value: &Value) -> Result<Vec<u8>> {
    let mut v = value.clone();
    sort_keys(&mut v);
    Ok(serde_json::to_vec(&v)?)
}

/// Reads `path` (or stdin for `-`), refusing inputs larger than `max_bytes`.
pub fn read_bounded(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    if path.as_os_str() == "-" {
        std::io::stdin()
            .lock()
            .take(max_bytes.saturating_add(1))
            .read_to_end(&mut buf)
            .context("read stdin")?;
    } else {
        let file =
            std::fs::File::open(path).with_context(|| format!("open: {}", path.display()))?;
        file.take(max_bytes.saturating_add(1))
            .read_to_end(&mut buf)
            .with_context(|| format!("read: {}", path.display()))?;
    }
    if buf.len() as u64 > max_bytes {
        anyhow::bail!(
            "input too large: {} exceeds {max_bytes} bytes (SCDC_MAX_INPUT_BYTES)",
            path.display()
        );
    }
    Ok(buf)
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
    }
    std::fs::write(path, bytes).with_context(|| format!("write: {}", path.display()))
}
