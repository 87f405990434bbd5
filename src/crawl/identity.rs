//! Checkpoint identity.

use crate::types::CommandKind;

/// Hash binding a checkpoint to the command, account, and root spec that produced it.
///
/// Parts are length-prefixed so `("a:b", "c")` and `("a", "b:c")` never collide.
pub fn identity_hash(command: CommandKind, account_fingerprint: &str, root_spec: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in [command.as_str(), account_fingerprint, root_spec] {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize().as_bytes())
}
