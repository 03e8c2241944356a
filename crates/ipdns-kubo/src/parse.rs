//! Parsers for the text the `ipfs` binary prints.

use ipdns_types::{ContentId, PointerId};

use crate::error::{KuboError, Result};

fn unexpected(command: &str, output: &str) -> KuboError {
    KuboError::UnexpectedOutput {
        command: command.to_string(),
        output: output.to_string(),
    }
}

/// `ipfs add <file>` prints `added <cid> <file>`.
pub fn parse_add_output(output: &str) -> Result<ContentId> {
    output
        .split_whitespace()
        .nth(1)
        .and_then(|token| ContentId::new(token).ok())
        .ok_or_else(|| unexpected("add", output))
}

/// `ipfs key gen <name>` prints the new key id on its own line.
pub fn parse_keygen_output(output: &str) -> Result<PointerId> {
    PointerId::new(output.trim()).map_err(|_| unexpected("key gen", output))
}

/// `ipfs key list -l` prints one `<key> <name>` pair per line.
pub fn parse_key_list(output: &str) -> Result<Vec<(String, PointerId)>> {
    let mut keys = Vec::new();
    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(unexpected("key list", line));
        };
        let key = PointerId::new(key).map_err(|_| unexpected("key list", line))?;
        keys.push((name.to_string(), key));
    }
    keys.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(keys)
}

/// `ipfs name resolve <key>` prints `/ipfs/<cid>`, possibly with a subpath.
pub fn parse_resolve_output(output: &str) -> Result<ContentId> {
    let path = output.trim();
    path.strip_prefix("/ipfs/")
        .and_then(|rest| rest.split('/').next())
        .and_then(|cid| ContentId::new(cid).ok())
        .ok_or_else(|| unexpected("name resolve", output))
}

/// Whether `ipfs key gen` refused because the name is taken.
pub fn is_already_exists(stderr: &str) -> bool {
    stderr.contains("already exists")
}

/// Whether `ipfs name resolve` failed because nothing is published.
pub fn is_unresolvable(stderr: &str) -> bool {
    stderr.contains("could not resolve name") || stderr.contains("not found")
}

/// Whether `ipfs name publish` failed because the key name is unknown.
pub fn is_unknown_key(stderr: &str) -> bool {
    stderr.contains("no key by the given name")
}
